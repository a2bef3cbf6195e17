//! Terminal rendering of a grid page.

use backoffice_core::GridEngine;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

/// Output format for `list` and `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum Format {
    /// Bordered table with a paging footer.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// "`first`-`last` of `total` items", or "0 items" when nothing matches.
pub fn footer(grid: &GridEngine) -> String {
    match grid.range() {
        Some((first, last)) => format!("{first}-{last} of {} items", grid.total()),
        None => "0 items".to_string(),
    }
}

/// Current page as a table: the `#` display index, then one column per
/// grid column.
pub fn page_table(grid: &GridEngine) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header: Vec<Cell> = std::iter::once("#")
        .chain(grid.columns().iter().map(|c| c.header.as_str()))
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header);

    for row in grid.visible_slice() {
        let mut cells = vec![row.display_index.to_string()];
        cells.extend(grid.cells(row.record));
        table.add_row(cells);
    }
    table
}

/// Prints the current page in `format`.
pub fn print_page(grid: &GridEngine, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            let rows: Vec<_> = grid.visible_slice().iter().map(|row| row.record).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Format::Table => {
            if grid.total() == 0 {
                println!("{}", "No results.".dimmed());
            } else {
                println!("{}", page_table(grid));
            }
            println!(
                "{}  (page {} of {})",
                footer(grid),
                grid.current_page(),
                grid.page_count()
            );
        }
    }
    Ok(())
}
