use passforge_core::ir::{BinaryOp, BlockId, Callee, Inst, Linkage, Operand, Terminator, ValueId};
use passforge_core::{DebugInfoQuery, Error, Module};

const DEMO_MODULE: &str = r#"{
  "name": "demo",
  "functions": [
    {
      "name": "main",
      "blocks": [
        {
          "id": 0,
          "insts": [
            { "op": "call", "dest": 0, "callee": { "direct": "helper" }, "args": [ { "const": 20 } ] },
            { "op": "call", "callee": { "indirect": { "function": "helper" } } },
            { "op": "call", "callee": { "direct": "printf" }, "args": [ { "value": 0 } ] }
          ],
          "terminator": { "op": "return", "value": { "value": 0 } }
        }
      ]
    },
    {
      "name": "helper",
      "params": [0],
      "linkage": "internal",
      "blocks": [
        {
          "id": 0,
          "insts": [
            { "op": "binary", "dest": 1, "operator": "add", "lhs": { "value": 0 }, "rhs": { "const": 1 } }
          ],
          "terminator": { "op": "return", "value": { "value": 1 } }
        }
      ]
    },
    { "name": "printf", "attributes": { "variadic": true } }
  ],
  "debug_info": {
    "compile_units": [
      {
        "directory": "/work",
        "filename": "demo.c",
        "subprograms": [
          { "name": "main", "function": "main", "line": 7 }
        ]
      }
    ]
  }
}"#;

const LOOP_MODULE: &str = r#"{
  "name": "simple",
  "functions": [
    {
      "name": "spin",
      "params": [0],
      "blocks": [
        { "id": 0, "terminator": { "op": "jump", "target": 1 } },
        {
          "id": 1,
          "insts": [ { "op": "copy", "dest": 0, "src": { "const": 3 } } ],
          "terminator": { "op": "branch", "cond": { "value": 0 }, "then_block": 1, "else_block": 2 }
        },
        { "id": 2, "terminator": { "op": "return" } }
      ]
    },
    { "name": "ext" }
  ]
}"#;

#[test]
fn test_parse_control_flow() {
    let module = Module::from_json(LOOP_MODULE).unwrap();
    assert_eq!(module.name, "simple");
    assert_eq!(module.functions.len(), 2);
    assert!(module.function("ext").unwrap().is_declaration());

    let spin = module.function("spin").unwrap();
    assert_eq!(spin.linkage, Linkage::External);
    assert_eq!(
        spin.blocks[1].terminator.successors(),
        vec![BlockId(1), BlockId(2)]
    );
    assert_eq!(spin.blocks[2].terminator, Terminator::Return { value: None });
}

#[test]
fn test_parse_calls_and_debug_info() {
    let module = Module::from_json(DEMO_MODULE).unwrap();

    let main = module.function("main").unwrap();
    match &main.blocks[0].insts[0] {
        Inst::Call { callee, args, .. } => {
            assert_eq!(callee, &Callee::Direct("helper".to_string()));
            assert_eq!(args, &vec![Operand::Const(20)]);
        }
        other => panic!("expected a call, got {:?}", other),
    }
    assert_eq!(main.address_taken_functions(), vec!["helper"]);
    assert!(main.call_sites()[1].is_indirect());

    let helper = module.function("helper").unwrap();
    assert_eq!(
        helper.blocks[0].insts[0],
        Inst::Binary {
            dest: ValueId(1),
            op: BinaryOp::Add,
            lhs: Operand::Value(ValueId(0)),
            rhs: Operand::Const(1),
        }
    );
    assert!(module.function("printf").unwrap().attributes.variadic);

    let location = module.function_location("main").unwrap();
    assert_eq!(location.to_string(), "/work/demo.c 7");
    assert!(module.function_location("helper").is_none());
}

#[test]
fn test_round_trip_preserves_module() {
    for source in [DEMO_MODULE, LOOP_MODULE] {
        let module = Module::from_json(source).unwrap();
        let json = module.to_json().unwrap();
        assert_eq!(Module::from_json(&json).unwrap(), module);
    }
}

#[test]
fn test_dangling_branch_target() {
    let json = r#"{
      "name": "bad",
      "functions": [
        { "name": "f", "blocks": [ { "id": 0, "terminator": { "op": "jump", "target": 9 } } ] }
      ]
    }"#;
    assert!(matches!(
        Module::from_json(json),
        Err(Error::UnknownBlock {
            block: BlockId(9),
            ..
        })
    ));
}

#[test]
fn test_duplicate_function_names() {
    let json = r#"{ "name": "dup", "functions": [ { "name": "f" }, { "name": "f" } ] }"#;
    assert!(matches!(
        Module::from_json(json),
        Err(Error::DuplicateFunction(name)) if name == "f"
    ));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        Module::from_json(r#"{ "name": "#),
        Err(Error::Json(_))
    ));
}
