//! SSA (Static Single Assignment) integration tests.
//!
//! These tests verify the complete SSA pipeline using the public API:
//! 1. Parse a program from the JSON samples
//! 2. Convert each function to SSA form
//! 3. Re-read the output and build its control flow graph
//! 4. Verify SSA properties (single assignment, dominating definitions, phi operands)

use std::collections::HashMap;

use brilflow::{prelude::*, ssa::program_to_ssa_with_stats};

const DIAMOND: &str = include_str!("samples/diamond.json");
const STRAIGHT: &str = include_str!("samples/straight.json");
const NESTED_LOOPS: &str = include_str!("samples/nested_loops.json");
const IRREGULAR: &str = include_str!("samples/irregular.json");

/// Where a name is defined in the converted function.
#[derive(Debug, Clone, Copy)]
enum DefSite {
    Param,
    Instruction { block: NodeId, index: usize },
}

/// Checks the SSA property on a converted function.
///
/// Every name is assigned at most once, and every use in a reachable block is either a
/// parameter, an undefined pass-through name, or a definition that dominates it. Phi operands
/// must be defined in a block dominating the matching predecessor.
fn check_ssa(ssa: &Function) -> Result<()> {
    let cfg = ControlFlowGraph::from_function(ssa)?;
    let dominance = DominatorAnalysis::compute(&cfg, &AnalysisConfig::default())?;

    let mut defs: HashMap<&str, DefSite> = HashMap::new();
    for param in &ssa.args {
        assert!(defs.insert(&param.name, DefSite::Param).is_none());
    }
    for (block, bb) in cfg.blocks() {
        for (index, instr) in bb.instructions.iter().enumerate() {
            if let Some(dest) = instr.dest() {
                let previous = defs.insert(dest, DefSite::Instruction { block, index });
                assert!(previous.is_none(), "{}: '{dest}' assigned twice", ssa.name);
            }
        }
    }

    for (block, bb) in cfg.blocks() {
        if !dominance.is_reachable(block) {
            continue;
        }
        for (index, instr) in bb.instructions.iter().enumerate() {
            if let Instruction::Phi { args, labels, .. } = instr {
                assert_eq!(args.len(), labels.len());
                for (arg, label) in args.iter().zip(labels) {
                    let Some(pred) = cfg.node_by_name(label) else {
                        panic!("phi names missing block {label}");
                    };
                    assert!(cfg.predecessors(block).any(|p| p == pred));
                    match defs.get(arg.as_str()) {
                        Some(DefSite::Instruction { block: def, .. }) => assert!(
                            !dominance.is_reachable(pred) || dominance.dominates(*def, pred),
                            "{}: phi operand '{arg}' does not reach from {label}",
                            ssa.name
                        ),
                        Some(DefSite::Param) => {}
                        None => panic!("{}: phi operand '{arg}' is never defined", ssa.name),
                    }
                }
                continue;
            }

            for arg in instr.args() {
                match defs.get(arg.as_str()) {
                    Some(DefSite::Instruction { block: def, index: at }) => {
                        let dominated = if *def == block {
                            *at < index
                        } else {
                            dominance.dominates(*def, block)
                        };
                        assert!(dominated, "{}: use of '{arg}' not dominated", ssa.name);
                    }
                    Some(DefSite::Param) | None => {}
                }
            }
        }
    }
    Ok(())
}

fn convert(json: &str) -> Result<(Program, SsaStats)> {
    let program = Program::from_json_str(json)?;
    program_to_ssa_with_stats(&program, &AnalysisConfig::default())
}

fn phis_in<'a>(function: &'a Function, block: &str) -> Vec<&'a Instruction> {
    function
        .instrs
        .iter()
        .skip_while(|i| i.as_label() != Some(block))
        .skip(1)
        .take_while(|i| i.is_phi())
        .collect()
}

#[test]
fn test_ssa_diamond_single_phi() -> Result<()> {
    let (program, stats) = convert(DIAMOND)?;
    let main = &program.functions[0];
    check_ssa(main)?;

    assert_eq!(stats.phis, 1, "Expected exactly one phi");
    let merge = phis_in(main, "merge");
    assert_eq!(merge.len(), 1);
    assert_eq!(merge[0].labels(), ["b1", "b2"]);
    assert_eq!(merge[0].args().len(), 2);

    let print = main
        .instrs
        .iter()
        .find(|i| i.op() == Some("print"))
        .expect("print survives");
    assert_eq!(print.args(), [merge[0].dest().unwrap_or_default()]);
    Ok(())
}

#[test]
fn test_ssa_straight_line_no_phis() -> Result<()> {
    let (program, stats) = convert(STRAIGHT)?;
    check_ssa(&program.functions[0])?;
    assert_eq!(stats.phis, 0);
    assert_eq!(stats.renamed_definitions, 2);
    assert_eq!(stats.undefined_uses, 0);
    Ok(())
}

#[test]
fn test_ssa_nested_loops() -> Result<()> {
    let (program, stats) = convert(NESTED_LOOPS)?;
    let main = &program.functions[0];
    check_ssa(main)?;
    assert_eq!(stats.undefined_uses, 0);

    // the unlabeled entry is emitted because the outer header's phis name it
    assert_eq!(main.instrs[0].as_label(), Some("__b0"));

    let outer = phis_in(main, "outer");
    let merged: Vec<&str> = outer
        .iter()
        .filter_map(|p| p.dest())
        .map(|d| d.split('.').next().unwrap_or(d))
        .collect();
    assert!(merged.contains(&"i"));
    assert!(merged.contains(&"total"));
    for phi in &outer {
        assert!(phi.labels().iter().all(|l| l == "__b0" || l == "outer_latch"));
    }

    assert!(main.instrs.iter().all(|i| i.dest() != Some("n")));
    Ok(())
}

#[test]
fn test_ssa_irregular_functions() -> Result<()> {
    let (program, stats) = convert(IRREGULAR)?;
    for function in &program.functions {
        check_ssa(function)?;
    }

    let self_loop = program.function("self_loop").expect("self_loop converted");
    let spin = phis_in(self_loop, "spin");
    assert_eq!(spin.len(), 1);
    assert_eq!(spin[0].labels(), ["entry", "spin"]);
    assert_eq!(self_loop.ty, Some(Type::from("int")));

    // 'shore' is renamed as its own root, so it cannot see the definition in 'island'
    assert_eq!(stats.undefined_uses, 1);

    let empty = program.function("empty").expect("empty converted");
    assert!(empty.instrs.is_empty());
    Ok(())
}

#[test]
fn test_ssa_strict_rejects_undefined_use() {
    let program = Program::from_json_str(IRREGULAR).unwrap();
    let err = program_to_ssa(&program, &AnalysisConfig::strict()).unwrap_err();
    assert!(matches!(
        err,
        Error::UseBeforeDefinition { ref function, ref block, ref variable }
            if function == "islands" && block == "shore" && variable == "y"
    ));
}

#[test]
fn test_ssa_parallel_matches_sequential() -> Result<()> {
    let program = Program::from_json_str(IRREGULAR)?;
    let parallel = program_to_ssa(&program, &AnalysisConfig::default())?;
    let sequential = program_to_ssa(&program, &AnalysisConfig::default().with_parallel(false))?;
    assert_eq!(parallel, sequential);
    Ok(())
}

#[test]
fn test_ssa_output_round_trips_through_json() -> Result<()> {
    let (program, _) = convert(NESTED_LOOPS)?;
    let mut buffer = Vec::new();
    program.to_writer_pretty(&mut buffer)?;
    let reread = Program::from_reader(buffer.as_slice())?;
    assert_eq!(reread, program);

    let err = to_ssa(&reread.functions[0], &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedIr { .. }));
    Ok(())
}
