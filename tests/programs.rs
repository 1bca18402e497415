use std::collections::VecDeque;
use std::thread;

use intcode_core::{Computer, Interrupt, NoInput, State, VmError};
use pretty_assertions::assert_eq;

const EQUALS_EIGHT: &str = "3,9,8,9,10,9,4,9,99,-1,8";
const LESS_THAN_EIGHT: &str = "3,9,7,9,10,9,4,9,99,-1,8";
const EQUALS_EIGHT_IMMEDIATE: &str = "3,3,1108,-1,8,3,4,3,99";
const JUMP_POSITION: &str = "3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9";
const JUMP_IMMEDIATE: &str = "3,3,1105,-1,9,1101,0,0,12,4,12,99,1";
const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,20,\
1105,1,46,98,99";
const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
const FEEDBACK_AMPLIFIER: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,\
1001,28,-1,28,1005,28,6,99,0,0,5";

fn run(program: &str, inputs: &[i64]) -> Vec<i64> {
    let mut computer: Computer = program.parse().unwrap();
    computer.run(inputs.iter().copied()).unwrap()
}

#[test]
fn canonical_add_multiply_program() {
    let mut computer: Computer = "1,1,1,4,99,5,6,0,99".parse().unwrap();
    let mut output: Vec<i64> = Vec::new();
    assert_eq!(
        computer.resume(&mut NoInput, &mut output),
        Ok(Interrupt::Terminated)
    );
    assert_eq!(computer.to_string(), "30,1,1,4,2,5,6,0,99");
}

#[test]
fn input_output_round_trip() {
    let mut computer: Computer = "3,0,4,0,99".parse().unwrap();
    let mut input: VecDeque<i64> = VecDeque::new();
    let mut output: Vec<i64> = Vec::new();

    assert_eq!(
        computer.resume(&mut input, &mut output),
        Ok(Interrupt::AwaitingInput)
    );
    input.push_back(7);
    assert_eq!(
        computer.resume(&mut input, &mut output),
        Ok(Interrupt::OutputReady)
    );
    assert_eq!(output, vec![7]);
    assert_eq!(
        computer.resume(&mut input, &mut output),
        Ok(Interrupt::Terminated)
    );
    assert_eq!(computer.state(), State::Terminated);
    assert_eq!(
        computer.resume(&mut input, &mut output),
        Err(VmError::AlreadyTerminated)
    );
}

#[test]
fn comparison_programs() {
    assert_eq!(run(EQUALS_EIGHT, &[8]), vec![1]);
    for other in [-8, 0, 7, 9, 800] {
        assert_eq!(run(EQUALS_EIGHT, &[other]), vec![0]);
    }

    assert_eq!(run(LESS_THAN_EIGHT, &[7]), vec![1]);
    assert_eq!(run(LESS_THAN_EIGHT, &[8]), vec![0]);

    assert_eq!(run(EQUALS_EIGHT_IMMEDIATE, &[8]), vec![1]);
    assert_eq!(run(EQUALS_EIGHT_IMMEDIATE, &[3]), vec![0]);
}

#[test]
fn jump_programs() {
    for program in [JUMP_POSITION, JUMP_IMMEDIATE] {
        assert_eq!(run(program, &[0]), vec![0]);
        assert_eq!(run(program, &[5]), vec![1]);
    }

    assert_eq!(run(COMPARE_TO_EIGHT, &[7]), vec![999]);
    assert_eq!(run(COMPARE_TO_EIGHT, &[8]), vec![1000]);
    assert_eq!(run(COMPARE_TO_EIGHT, &[9]), vec![1001]);
}

#[test]
fn branch_around_write_takes_one_path() {
    // if input != 0 write 7 to 32, else write 5 to 31
    let program = "3,30,1005,30,10,1101,0,5,31,99,1101,0,7,32,99";

    let mut taken: Computer = program.parse().unwrap();
    taken.run([1]).unwrap();
    assert_eq!(taken.get_memory_value(31), Some(0));
    assert_eq!(taken.get_memory_value(32), Some(7));

    let mut not_taken: Computer = program.parse().unwrap();
    not_taken.run([0]).unwrap();
    assert_eq!(not_taken.get_memory_value(31), Some(5));
    assert_eq!(not_taken.get_memory_value(32), Some(0));

    // same shape with jump-if-false
    let program = "3,30,1006,30,10,1101,0,5,31,99,1101,0,7,32,99";
    let mut taken: Computer = program.parse().unwrap();
    taken.run([0]).unwrap();
    assert_eq!(taken.get_memory_value(31), Some(0));
    assert_eq!(taken.get_memory_value(32), Some(7));
}

#[test]
fn relative_mode_quine() {
    let expected: Vec<i64> = QUINE.split(',').map(|t| t.parse().unwrap()).collect();
    assert_eq!(run(QUINE, &[]), expected);
}

#[test]
fn large_values() {
    assert_eq!(
        run("1102,34915192,34915192,7,4,7,99,0", &[]),
        vec![1_219_070_632_396_864]
    );
    assert_eq!(run("104,1125899906842624,99", &[]), vec![1_125_899_906_842_624]);
}

#[test]
fn memory_inspection_is_idempotent() {
    let mut computer: Computer = "1,0,0,0,99".parse().unwrap();
    computer.run([]).unwrap();
    let first: Vec<_> = (0..10).map(|a| computer.get_memory_value(a)).collect();
    let second: Vec<_> = (0..10).map(|a| computer.get_memory_value(a)).collect();
    assert_eq!(first, second);
    assert_eq!(computer.get_memory_value(1 << 50), Some(0));
    assert_eq!(computer.get_memory_value(-1), None);
}

#[test]
fn feedback_loop_between_computers() {
    let phases = [9, 8, 7, 6, 5];
    let mut amplifiers: Vec<Computer> = phases
        .iter()
        .map(|_| FEEDBACK_AMPLIFIER.parse().unwrap())
        .collect();
    let mut queues: Vec<VecDeque<i64>> = phases.iter().map(|&p| VecDeque::from([p])).collect();
    queues[0].push_back(0);

    let mut last_signal = None;
    while !amplifiers.iter().all(Computer::is_terminated) {
        for index in 0..amplifiers.len() {
            if amplifiers[index].is_terminated() {
                continue;
            }
            let next = (index + 1) % amplifiers.len();
            let mut output: Vec<i64> = Vec::new();
            let mut input = std::mem::take(&mut queues[index]);
            loop {
                match amplifiers[index].resume(&mut input, &mut output).unwrap() {
                    Interrupt::OutputReady => continue,
                    Interrupt::AwaitingInput | Interrupt::Terminated => break,
                }
            }
            queues[index] = input;
            if index == amplifiers.len() - 1 {
                last_signal = output.last().copied().or(last_signal);
            }
            queues[next].extend(output);
        }
    }

    assert_eq!(last_signal, Some(139_629_729));
}

#[test]
fn computers_run_on_separate_threads() {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| scope.spawn(move || run(EQUALS_EIGHT, &[6 + n])))
            .collect();
        let results: Vec<Vec<i64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![vec![0], vec![0], vec![1], vec![0]]);
    });
}

#[test]
fn malformed_program_text() {
    assert_eq!(
        "1,2,three".parse::<Computer>().err(),
        Some(VmError::MalformedProgram {
            token: "three".to_string(),
            position: 2,
        })
    );
}
