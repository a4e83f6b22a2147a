//! List command implementation

use passforge_optimizer::PassRegistry;

pub fn list() {
    let registry = PassRegistry::with_builtin_passes();
    let width = registry
        .passes()
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);
    for pass in registry.passes() {
        println!("{:width$}  {}", pass.name, pass.description, width = width);
    }
}
