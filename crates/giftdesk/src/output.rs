//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use giftdesk_core::{PaginatedList, VoucherState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Voucher state label, colored when enabled.
pub fn state_label(state: VoucherState, color: bool) -> String {
    let label = state.to_string();
    if !color {
        return label;
    }
    match state {
        VoucherState::Active => label.green().to_string(),
        VoucherState::Redeemed => label.blue().to_string(),
        VoucherState::Expired => label.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one page of a list. Structured formats keep the pagination
/// fields; the table gets a page footer.
pub fn render_page<T, R>(
    format: &OutputFormat,
    page: &PaginatedList<T>,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Json => render_json(page, false),
        OutputFormat::JsonCompact => render_json(page, true),
        OutputFormat::Yaml => render_yaml(page),
        OutputFormat::Table => {
            let table = render_list(format, &page.items, to_row, id_fn)?;
            Ok(format!(
                "{table}\nPage {} of {} ({} total)",
                page.page,
                page.pages.max(1),
                page.total
            ))
        }
        OutputFormat::Plain => render_list(format, &page.items, to_row, id_fn),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: &'static str,
    }

    fn page() -> PaginatedList<Item> {
        PaginatedList {
            items: vec![Item { id: "a" }, Item { id: "b" }],
            page: 1,
            limit: 2,
            total: 3,
            pages: 2,
        }
    }

    #[test]
    fn plain_prints_one_id_per_line() {
        let out = render_page(&OutputFormat::Plain, &page(), |i| Row { id: i.id }, |i| i.id.into())
            .unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn json_keeps_pagination() {
        let out = render_page(
            &OutputFormat::JsonCompact,
            &page(),
            |i| Row { id: i.id },
            |i| i.id.into(),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["pages"], 2);
        assert_eq!(value["items"][1]["id"], "b");
    }

    #[test]
    fn table_has_page_footer() {
        let out = render_page(&OutputFormat::Table, &page(), |i| Row { id: i.id }, |i| i.id.into())
            .unwrap();
        assert!(out.contains("ID"));
        assert!(out.ends_with("Page 1 of 2 (3 total)"));
    }

    #[test]
    fn uncolored_state_is_plain_text() {
        assert_eq!(state_label(VoucherState::Expired, false), "expired");
    }
}
