use crate::parser::ParsedRequest;
use crate::runner::types::RunOutcome;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use std::fmt::Display;
use std::path::Path;

/// 保存/运行结果的终端输出
pub struct Reporter {
    /// 是否逐行输出 k6 的输出
    stream_output: bool,
}

impl Reporter {
    pub fn new(stream_output: bool) -> Self {
        Self { stream_output }
    }

    pub fn print_saved(&self, path: &Path) {
        println!("{} Script saved as {}", "✓".green(), path.display());
    }

    pub fn print_save_failure(&self, error: &dyn Display) {
        eprintln!("{} {}", "✗".red(), format_save_failure(error).red());
    }

    pub fn print_run_header(&self, script_path: &Path, k6_path: &str) {
        println!(
            "\n{} {} run {}\n",
            "Running".bold(),
            k6_path.cyan(),
            script_path.display()
        );
    }

    /// 打印一行 k6 输出
    pub fn print_line(&self, line: &str) {
        if self.stream_output {
            println!("  {}", line);
        }
    }

    /// 未逐行输出时，运行结束后需要补打的 k6 输出
    pub fn deferred_output<'a>(&self, outcome: &'a RunOutcome) -> Option<&'a str> {
        (!self.stream_output).then_some(outcome.output.as_str())
    }

    pub fn print_outcome(&self, outcome: &RunOutcome) {
        if let Some(output) = self.deferred_output(outcome) {
            for line in output.lines() {
                println!("  {}", line);
            }
        }

        println!("\n{}", "━".repeat(50));
        let status = outcome.status_message();
        if outcome.is_success() {
            println!("{} {}", "✓".green(), status.green());
        } else {
            println!("{} {}", "!".yellow(), status.yellow());
        }
        println!(
            "  {}: {}",
            "Started".bold(),
            outcome.started_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!(
            "  {}: {:.3}s",
            "Duration".bold(),
            outcome.elapsed.as_secs_f64()
        );
        println!();
    }

    pub fn print_run_failure(&self, error: &dyn Display) {
        eprintln!("{} {}", "✗".red(), format_run_failure(error).red());
    }

    /// 以表格形式打印解析结果
    pub fn print_request(&self, request: &ParsedRequest) {
        println!("{}", request_table(request));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true)
    }
}

pub fn format_save_failure(error: &dyn Display) -> String {
    format!("Failed to save script: {}", error)
}

pub fn format_run_failure(error: &dyn Display) -> String {
    format!("Test failed: {}", error)
}

pub fn request_table(request: &ParsedRequest) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Field", "Value"]);

    table.add_row(vec![
        Cell::new("Method").add_attribute(Attribute::Bold),
        Cell::new(&request.method).fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new("URL").add_attribute(Attribute::Bold),
        Cell::new(&request.url),
    ]);
    for header in &request.headers {
        table.add_row(vec![
            Cell::new("Header").add_attribute(Attribute::Bold),
            Cell::new(header),
        ]);
    }
    let body = request.body.as_deref().unwrap_or("(none)");
    table.add_row(vec![
        Cell::new("Body").add_attribute(Attribute::Bold),
        Cell::new(body).add_attribute(Attribute::Dim),
    ]);

    table
}
