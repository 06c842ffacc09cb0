//! Property-based tests for carry-vm.
//!
//! Uses proptest to check engine invariants across random programs, inputs
//! and action sequences.

#[cfg(test)]
mod tests {
    use crate::engine::{ControlAction, ProgramState, Session, Speed};
    use crate::isa::{execute, Instruction, Outcome};
    use crate::level::Level;
    use crate::machine::{AddressSpace, ByteValue, ExecError, MachineState};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn instruction() -> impl Strategy<Value = Instruction> {
        let address = 0usize..4;
        let target = 0usize..8;
        prop_oneof![
            Just(Instruction::Load),
            Just(Instruction::Return),
            address.clone().prop_map(|address| Instruction::CopyTo { address }),
            address.clone().prop_map(|address| Instruction::CopyFrom { address }),
            address.clone().prop_map(|address| Instruction::Increment { address }),
            address.clone().prop_map(|address| Instruction::Decrement { address }),
            address.clone().prop_map(|address| Instruction::Add { address }),
            address.prop_map(|address| Instruction::Subtract { address }),
            target.clone().prop_map(|target| Instruction::Jump { target }),
            target.clone().prop_map(|target| Instruction::JumpIfZero { target }),
            target.prop_map(|target| Instruction::JumpIfNegative { target }),
        ]
    }

    fn control_action() -> impl Strategy<Value = ControlAction> {
        prop_oneof![
            1 => Just(ControlAction::Play),
            1 => Just(ControlAction::Pause),
            1 => Just(ControlAction::Reset),
            4 => Just(ControlAction::StepForward),
            2 => Just(ControlAction::StepBackward),
            1 => (1u8..=10).prop_map(|v| ControlAction::SetSpeed {
                speed: Speed::try_from(v).unwrap_or_default()
            }),
        ]
    }

    fn cell() -> impl Strategy<Value = Option<ByteValue>> {
        prop_oneof![
            Just(None),
            (-5i64..5).prop_map(|n| Some(ByteValue::Number(n))),
            Just(Some(ByteValue::Char('x'))),
        ]
    }

    fn session(inputs: Vec<i64>, memory_size: usize, program: Vec<Instruction>) -> Session {
        let level = Level {
            memory_size,
            ..Level::double().with_fixed_input(inputs)
        };
        let init = level.initialize().unwrap();
        Session::new(init, program, Speed::default())
    }

    fn drive(mut session: Session, actions: &[ControlAction]) -> Session {
        for action in actions {
            session = session.apply(*action);
            assert!(session.history().cursor() < session.history().len());
        }
        session
    }

    // ========================================================================
    // History Property Tests
    // ========================================================================

    proptest! {
        /// Stepping back then forward lands on an identical snapshot.
        #[test]
        fn prop_step_back_then_forward_is_identity(
            inputs in prop::collection::vec(-20i64..20, 1..5),
            program in prop::collection::vec(instruction(), 1..8),
            actions in prop::collection::vec(control_action(), 0..40),
        ) {
            let s = drive(session(inputs, 2, program), &actions);
            prop_assume!(s.history().cursor() > 0);

            let before = s.snapshot();
            let s = s
                .apply(ControlAction::StepBackward)
                .apply(ControlAction::StepForward);
            prop_assert_eq!(s.snapshot(), before);
        }

        /// Reset always returns to the initial snapshot in Pending.
        #[test]
        fn prop_reset_restores_initial_state(
            inputs in prop::collection::vec(-20i64..20, 1..5),
            program in prop::collection::vec(instruction(), 1..8),
            actions in prop::collection::vec(control_action(), 0..40),
        ) {
            let s = session(inputs, 2, program.clone());
            let expected = s.level().initial_state(Arc::from(program));

            let s = drive(s, &actions).apply(ControlAction::Reset);
            prop_assert_eq!(s.state(), &ProgramState::Pending);
            prop_assert_eq!(s.history().len(), 1);
            prop_assert_eq!(&**s.current(), &expected);
        }

        /// Recorded snapshots are never rewritten by replay or new steps.
        #[test]
        fn prop_history_is_append_only(
            inputs in prop::collection::vec(-20i64..20, 1..5),
            program in prop::collection::vec(instruction(), 1..8),
            actions in prop::collection::vec(
                prop_oneof![Just(ControlAction::StepForward), Just(ControlAction::StepBackward)],
                0..40,
            ),
        ) {
            let mut s = session(inputs, 2, program);
            let mut seen: Vec<Arc<MachineState>> = vec![Arc::clone(s.current())];

            for action in actions {
                s = s.apply(action);
                let entries = s.history().entries();
                prop_assert!(entries.len() >= seen.len());
                for (old, new) in seen.iter().zip(entries) {
                    prop_assert!(Arc::ptr_eq(old, new));
                }
                seen = entries.to_vec();
            }
        }
    }

    // ========================================================================
    // Bounds Property Tests
    // ========================================================================

    proptest! {
        /// Memory instructions past the end of memory fault with OutOfBound.
        #[test]
        fn prop_memory_out_of_bounds(
            memory in prop::collection::vec(cell(), 0..4),
            carry in cell(),
            excess in 0usize..5,
            pick in 0usize..6,
        ) {
            let address = memory.len() + excess;
            let instr = [
                Instruction::CopyTo { address },
                Instruction::CopyFrom { address },
                Instruction::Increment { address },
                Instruction::Decrement { address },
                Instruction::Add { address },
                Instruction::Subtract { address },
            ][pick];

            let mut state = MachineState::new(vec![], memory.len(), vec![instr].into());
            state.memory = memory.clone();
            state.carry = carry;

            prop_assert_eq!(
                execute(&instr, &state, &[]),
                Outcome::Fault(ExecError::OutOfBound {
                    space: AddressSpace::Memory,
                    address,
                    limit: memory.len(),
                })
            );
        }

        /// Jumps check their target; untaken branches advance by one
        /// whatever the target.
        #[test]
        fn prop_jump_bounds(
            stack_len in 1usize..6,
            target in 0usize..12,
            carry in -3i64..3,
        ) {
            let stack: Arc<[Instruction]> = vec![Instruction::Load; stack_len].into();
            let mut state = MachineState::new(vec![], 0, stack);
            state.carry = Some(ByteValue::Number(carry));

            let cases = [
                (Instruction::Jump { target }, true),
                (Instruction::JumpIfZero { target }, carry == 0),
                (Instruction::JumpIfNegative { target }, carry < 0),
            ];
            for (instr, taken) in cases {
                let outcome = execute(&instr, &state, &[]);
                match (taken, target < stack_len) {
                    (true, true) => {
                        prop_assert!(matches!(outcome, Outcome::Next(ref s) if s.stack_pointer == target));
                    }
                    (true, false) => {
                        let is_stack_fault = matches!(
                            outcome,
                            Outcome::Fault(ExecError::OutOfBound { space: AddressSpace::Stack, .. })
                        );
                        prop_assert!(is_stack_fault);
                    }
                    (false, _) => {
                        prop_assert!(matches!(outcome, Outcome::Next(ref s) if s.stack_pointer == 1));
                    }
                }
            }
        }
    }

    // ========================================================================
    // End-to-end Property Tests
    // ========================================================================

    proptest! {
        /// The doubling solution finishes with every input doubled,
        /// last input first.
        #[test]
        fn prop_doubling_solution_finishes(
            inputs in prop::collection::vec(0i64..=100, 1..8),
        ) {
            let program = vec![
                Instruction::Load,
                Instruction::CopyTo { address: 0 },
                Instruction::Add { address: 0 },
                Instruction::Return,
                Instruction::Jump { target: 0 },
            ];
            let mut s = session(inputs.clone(), 1, program);
            for _ in 0..(inputs.len() * 5 + 1) {
                s = s.apply(ControlAction::StepForward);
            }

            let expected: Vec<ByteValue> = inputs.iter().rev().map(|v| ByteValue::Number(2 * v)).collect();
            prop_assert_eq!(s.state(), &ProgramState::Finished);
            prop_assert_eq!(&s.current().output, &expected);
            prop_assert_eq!(&s.level().output, &expected);
            prop_assert_eq!(s.history().len(), inputs.len() * 5 + 1);
        }
    }
}
