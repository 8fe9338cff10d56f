//! Sample observations shared by the unit and the integration tests.

use std::fmt::Write;

pub const HEADER: &str = "pf_time_of_day,bg_value,food_value,exercise_value,ins_value";

/// `ins = 0.5 t + 0.02 bg + 0.5 food - 0.3 exercise + 0.1`, plus a little noise.
///
/// The first row is always `1,120,2,0,4`, which lies exactly on the relation.
pub fn sample_rows(rows: usize) -> Vec<[f64; 5]> {
    let mut out = vec![[1.0, 120.0, 2.0, 0.0, 4.0]];
    for i in 1..rows {
        let t = (i % 4 + 1) as f64;
        let bg = (80 + (i * 13) % 120) as f64;
        let food = ((i * 7) % 5) as f64;
        let exercise = ((i / 4) % 3) as f64;
        let noise = ((i * 37) % 11) as f64 / 100.0 - 0.05;
        let ins = 0.5 * t + 0.02 * bg + 0.5 * food - 0.3 * exercise + 0.1 + noise;
        out.push([t, bg, food, exercise, ins]);
    }
    out
}

pub fn sample_csv(rows: usize) -> String {
    let mut csv = format!("{HEADER}\n");
    for [t, bg, food, exercise, ins] in sample_rows(rows) {
        let _ = writeln!(csv, "{t},{bg},{food},{exercise},{ins}");
    }
    csv
}

/// The same rows, handed to every user in `users` with a `userid` column.
pub fn partitioned_csv(rows: usize, users: &[&str]) -> String {
    let mut csv = format!("userid,{HEADER}\n");
    for user in users {
        for [t, bg, food, exercise, ins] in sample_rows(rows) {
            let _ = writeln!(csv, "{user},{t},{bg},{food},{exercise},{ins}");
        }
    }
    csv
}
