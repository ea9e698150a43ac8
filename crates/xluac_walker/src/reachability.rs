//! Worklist control-flow reachability analysis over a function's repaired
//! instruction stream.

use std::collections::VecDeque;
use xluac_format::instruction::Instruction;
use xluac_format::opcode::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityInfo {
    pub reachable_count: usize,
    pub has_holes: bool,
    pub trimmed_count: usize,
}

/// Runs a BFS from `pc=0` over `code`, following the per-opcode successor
/// model described in the module docs, and returns reachability diagnostics.
///
/// Trimming is computed but never applied to the buffer by this crate's
/// callers; the `trimmed_count` field exists purely for diagnostics.
pub fn mark_reachable(code: &[u32]) -> (Vec<bool>, ReachabilityInfo) {
    let count = code.len();
    let mut reachable = vec![false; count];

    if count == 0 {
        return (
            reachable,
            ReachabilityInfo {
                reachable_count: 0,
                has_holes: false,
                trimmed_count: 0,
            },
        );
    }

    let mut queue = VecDeque::new();
    reachable[0] = true;
    queue.push_back(0usize);

    let mut enqueue = |reachable: &mut Vec<bool>, queue: &mut VecDeque<usize>, target: i64| {
        if target >= 0 && (target as usize) < count && !reachable[target as usize] {
            reachable[target as usize] = true;
            queue.push_back(target as usize);
        }
    };

    while let Some(pc) = queue.pop_front() {
        let instr = Instruction(code[pc]);
        let op = instr.opcode();

        match op {
            OP_LFALSESKIP => {
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
                enqueue(&mut reachable, &mut queue, pc as i64 + 2);
            }
            OP_MMBIN | OP_MMBINI | OP_MMBINK | OP_SETLIST | OP_SELF => {
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
                if pc + 1 < count && Instruction(code[pc + 1]).opcode() == EXTRAARG_OPCODE {
                    enqueue(&mut reachable, &mut queue, pc as i64 + 2);
                }
            }
            OP_RETURN | OP_RETURN0 | OP_RETURN1 => {
                // terminal, no successors
            }
            OP_JMP => {
                let target = pc as i64 + 1 + instr.sj() as i64;
                enqueue(&mut reachable, &mut queue, target);
            }
            op if CONDITIONAL_TEST_OPCODES.contains(&op) => {
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
                enqueue(&mut reachable, &mut queue, pc as i64 + 2);
            }
            OP_FORLOOP | OP_TFORLOOP => {
                let target = pc as i64 + 1 + instr.sbx() as i64;
                enqueue(&mut reachable, &mut queue, target);
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
            }
            OP_FORPREP | OP_TFORPREP => {
                let target = pc as i64 + 1 + instr.sbx18() as i64;
                enqueue(&mut reachable, &mut queue, target);
                // terminal: no fallthrough
            }
            GAME_CUSTOM_OPCODE => {
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
            }
            _ => {
                enqueue(&mut reachable, &mut queue, pc as i64 + 1);
            }
        }
    }

    let reachable_count = reachable.iter().filter(|&&r| r).count();
    let last_reachable = reachable.iter().rposition(|&r| r);

    let info = match last_reachable {
        None => ReachabilityInfo {
            reachable_count: 0,
            has_holes: false,
            trimmed_count: count,
        },
        Some(last) => {
            let has_holes = reachable[0..last].iter().any(|&r| !r);
            let trimmed_count = if has_holes { count } else { last + 1 };
            ReachabilityInfo {
                reachable_count,
                has_holes,
                trimmed_count,
            }
        }
    };

    (reachable, info)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op_only(op: u8) -> u32 {
        Instruction(0).with_opcode(op).0
    }

    fn jmp(sbx: i32) -> u32 {
        Instruction(0).with_opcode(OP_JMP).with_sbx(sbx).0
    }

    #[test]
    fn straight_line_code_is_fully_reachable() {
        let code = vec![op_only(0), op_only(0), op_only(OP_RETURN0)];
        let (reachable, info) = mark_reachable(&code);
        assert!(reachable.iter().all(|&r| r));
        assert_eq!(info.reachable_count, 3);
        assert!(!info.has_holes);
        assert_eq!(info.trimmed_count, 3);
    }

    #[test]
    fn unconditional_jump_skips_dead_code() {
        // pc0: JMP +1 (skip pc1) -> pc2: RETURN0
        let code = vec![jmp(1), op_only(0), op_only(OP_RETURN0)];
        let (reachable, info) = mark_reachable(&code);
        assert!(reachable[0]);
        assert!(!reachable[1]);
        assert!(reachable[2]);
        assert!(info.has_holes);
        assert_eq!(info.trimmed_count, code.len());
    }

    #[test]
    fn trailing_dead_code_is_detected_without_holes() {
        // JMP with sbx=0 jumps to pc+1 == 1 (RETURN0); pc=2 is an unreachable tail.
        let code = vec![jmp(0), op_only(OP_RETURN0), op_only(0)];
        let (_, info) = mark_reachable(&code);
        assert!(!info.has_holes);
        assert_eq!(info.trimmed_count, 2);
    }

    #[test]
    fn conditional_test_has_two_successors() {
        let code = vec![op_only(58), op_only(0), op_only(OP_RETURN0)];
        let (reachable, _) = mark_reachable(&code);
        assert!(reachable.iter().all(|&r| r));
    }

    #[test]
    fn empty_code_is_trivially_handled() {
        let (reachable, info) = mark_reachable(&[]);
        assert!(reachable.is_empty());
        assert_eq!(info.reachable_count, 0);
        assert_eq!(info.trimmed_count, 0);
    }
}
