use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use colstack_binning::{NULL_LABEL, OTHER_LABEL};
use colstack_model::registry;

use crate::types::{BinSummary, RunResult};

pub fn print_run_summary(result: &RunResult) {
    println!("Input: {}", result.input.display());
    println!("Output: {}", result.output.display());
    if let Some(path) = &result.dump_config {
        println!("Configuration: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Rows in"), header_cell("Rows out"), header_cell("Columns")]);
    apply_summary_table_style(&mut table);
    for index in 0..3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let dropped = result.input_rows.saturating_sub(result.rows);
    table.add_row(vec![
        Cell::new(result.input_rows),
        count_cell(result.rows, dropped),
        Cell::new(result.columns),
    ]);
    println!("{table}");

    for summary in &result.bins {
        println!();
        print_bin_summary(summary);
    }
}

pub fn print_bin_summary(summary: &BinSummary) {
    if summary.label_column == summary.column {
        println!("Bins: {}", summary.column);
    } else {
        println!("Bins: {} -> {}", summary.column, summary.label_column);
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Bin"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, count) in &summary.groups {
        table.add_row(vec![label_cell(label), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.labelled_rows()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_types() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tag"),
        header_cell("Interval bins"),
        header_cell("Lower sentinel"),
        header_cell("Upper sentinel"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for info in registry().iter() {
        let (intervals, lower, upper) = match &info.bounds {
            Some((lower, upper)) => (
                Cell::new("yes").fg(Color::Green),
                Cell::new(lower),
                Cell::new(upper),
            ),
            None => (dim_cell("no"), dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![Cell::new(info.tag), intervals, lower, upper]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    if label == OTHER_LABEL || label == NULL_LABEL {
        Cell::new(label).fg(Color::DarkGrey)
    } else {
        Cell::new(label)
    }
}

fn count_cell(rows: usize, dropped: usize) -> Cell {
    if dropped > 0 {
        Cell::new(format!("{rows} (-{dropped})")).fg(Color::Yellow)
    } else {
        Cell::new(rows)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
