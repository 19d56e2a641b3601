//! HTML answer keys: every `<table>` becomes a [`RawTable`].

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use gatecalc_shared::{RawTable, TabularDocument, normalize_space};

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector"));
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("row selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("cell selector"));

/// Parse an HTML document into a single-page tabular document.
///
/// Rows of nested tables are attributed to the innermost table only.
pub fn html_tables(html: &str) -> TabularDocument {
    let doc = Html::parse_document(html);
    let tables = doc.select(&TABLE_SEL).map(table_rows).collect();
    TabularDocument::single_page(tables)
}

fn table_rows(table: ElementRef<'_>) -> RawTable {
    table
        .select(&ROW_SEL)
        .filter(|row| nearest_table(*row) == Some(table))
        .map(|row| {
            row.select(&CELL_SEL)
                .map(|cell| {
                    let text = normalize_space(&cell.text().collect::<Vec<_>>().join(" "));
                    (!text.is_empty()).then_some(text)
                })
                .collect()
        })
        .collect()
}

fn nearest_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cells_with_blank_as_none() {
        let html = "<table>\
            <tr><th>Q. No.</th><th>Q. Type</th><th>Section</th><th>Key</th></tr>\
            <tr><td>1</td><td> mcq </td><td>GA</td><td>B</td></tr>\
            <tr><td>2</td><td>NAT</td><td></td><td>1 to <b>2</b></td></tr>\
            </table>";
        let doc = html_tables(html);
        assert_eq!(doc.table_count(), 1);

        let table = &doc.pages[0].tables[0];
        assert_eq!(table.len(), 3);
        assert_eq!(table[0][1].as_deref(), Some("Q. Type"));
        assert_eq!(table[1][1].as_deref(), Some("mcq"));
        assert_eq!(table[2][2], None);
        assert_eq!(table[2][3].as_deref(), Some("1 to 2"));
    }

    #[test]
    fn nested_tables_do_not_leak_rows() {
        let html = "<table><tr><td>outer<table><tr><td>inner</td></tr></table></td></tr></table>";
        let doc = html_tables(html);
        let tables = &doc.pages[0].tables;
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[1], vec![vec![Some("inner".to_string())]]);
    }

    #[test]
    fn document_without_tables() {
        assert_eq!(html_tables("<p>none</p>").table_count(), 0);
    }
}
