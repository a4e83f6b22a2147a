//! Run command implementation

use crate::config::Config;
use anyhow::{bail, Context, Result};
use passforge_core::Module;
use passforge_optimizer::{Diagnostics, PassOptions, PassPipeline, PassRegistry, PipelineConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub file: PathBuf,
    pub passes: Vec<String>,
    pub inline_only_in_function: Option<String>,
    pub function_name: Option<String>,
    pub emit: Option<PathBuf>,
    pub print: bool,
    pub stats: bool,
}

impl RunOptions {
    /// Command-line values take precedence over the config file
    pub fn pipeline_config(&self, config: &Config) -> PipelineConfig {
        let passes = if self.passes.is_empty() {
            config.passes.pipeline.clone()
        } else {
            self.passes.clone()
        };
        PipelineConfig {
            passes,
            options: PassOptions {
                inline_only_in_function: self
                    .inline_only_in_function
                    .clone()
                    .or_else(|| config.passes.inline_only_in_function.clone()),
                function_name: self
                    .function_name
                    .clone()
                    .or_else(|| config.passes.function_name.clone()),
            },
        }
    }
}

pub fn run(options: RunOptions, config: &Config) -> Result<()> {
    let pipeline_config = options.pipeline_config(config);
    if pipeline_config.passes.is_empty() {
        bail!("no passes requested; use --passes or set `pipeline` under [passes] in the config file");
    }

    // Every pass is constructed before the module is read
    let registry = PassRegistry::with_builtin_passes();
    let mut pipeline = PassPipeline::from_config(&pipeline_config, &registry)?;

    let source = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;
    let mut module = Module::from_json(&source)
        .with_context(|| format!("failed to load module from {}", options.file.display()))?;

    info!(module = %module.name, passes = ?pipeline.pass_names(), "running passes");
    let mut diag = Diagnostics::stdio();
    let changed = pipeline.run(&mut module, &mut diag)?;

    if let Some(path) = &options.emit {
        std::fs::write(path, module.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), changed, "wrote module");
    }
    if options.print {
        print!("{}", module);
    }
    if options.stats || config.output.stats {
        eprint!("{}", pipeline.stats());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PassesConfig;

    #[test]
    fn test_command_line_overrides_config() {
        let config = Config {
            passes: PassesConfig {
                pipeline: vec!["function-names".to_string()],
                inline_only_in_function: Some("from_file".to_string()),
                function_name: Some("main".to_string()),
            },
            ..Config::default()
        };
        let options = RunOptions {
            passes: vec!["all-inline".to_string()],
            inline_only_in_function: Some("from_cli".to_string()),
            ..RunOptions::default()
        };

        let pipeline = options.pipeline_config(&config);
        assert_eq!(pipeline.passes, vec!["all-inline".to_string()]);
        assert_eq!(pipeline.options.inline_only_in_function.as_deref(), Some("from_cli"));
        assert_eq!(pipeline.options.function_name.as_deref(), Some("main"));
    }

    #[test]
    fn test_config_pipeline_used_when_no_passes_given() {
        let config = Config {
            passes: PassesConfig {
                pipeline: vec!["find-loops".to_string()],
                ..PassesConfig::default()
            },
            ..Config::default()
        };
        let pipeline = RunOptions::default().pipeline_config(&config);
        assert_eq!(pipeline.passes, vec!["find-loops".to_string()]);
        assert_eq!(pipeline.options, PassOptions::default());
    }
}
