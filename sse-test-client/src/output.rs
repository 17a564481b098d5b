use colored::*;

pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

pub fn print_result(result: &TestResult) {
    if result.passed {
        println!("{} {} - {}", "✓".green(), result.name, result.detail);
    } else {
        println!("{} {} - {}", "✗".red(), result.name.bold(), result.detail);
    }
}

pub fn print_test_summary(results: &[TestResult]) {
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    println!("\n{}", "=== SUMMARY ===".bright_white().bold());
    for result in results {
        print_result(result);
    }

    if failed == 0 {
        println!("{}", format!("All {} test(s) passed", passed).green().bold());
    } else {
        println!(
            "{}",
            format!("{} passed, {} FAILED", passed, failed).red().bold()
        );
    }
}
