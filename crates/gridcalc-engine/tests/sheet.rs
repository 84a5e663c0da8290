use gridcalc_core::{CellError, CellValue, Position, Size};
use gridcalc_engine::{Sheet, SheetError};
use gridcalc_formula::FormulaError;
use pretty_assertions::assert_eq;

fn pos(a1: &str) -> Position {
    let p = Position::from_a1(a1);
    assert!(p.is_valid(), "bad test position {:?}", a1);
    p
}

fn set(sheet: &mut Sheet, a1: &str, text: &str) {
    sheet.set_cell(pos(a1), text).unwrap();
}

fn value(sheet: &Sheet, a1: &str) -> CellValue {
    sheet.cell_value(pos(a1))
}

fn text(sheet: &Sheet, a1: &str) -> String {
    sheet
        .get_cell(pos(a1))
        .unwrap()
        .map(|c| c.text())
        .unwrap_or_default()
}

fn values_output(sheet: &Sheet) -> String {
    let mut out = Vec::new();
    sheet.print_values(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn texts_output(sheet: &Sheet) -> String {
    let mut out = Vec::new();
    sheet.print_texts(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn formula_over_number_cells() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "1");
    set(&mut sheet, "A2", "2");
    set(&mut sheet, "A3", "=A1+A2");

    assert_eq!(value(&sheet, "A3"), CellValue::Number(3.0));
    assert_eq!(text(&sheet, "A3"), "=A1+A2");
}

#[test]
fn self_reference_is_rejected() {
    let mut sheet = Sheet::new();
    assert_eq!(
        sheet.set_cell(pos("A1"), "=A1"),
        Err(SheetError::CircularDependency(pos("A1")))
    );
    assert!(sheet.get_cell(pos("A1")).unwrap().is_none());
}

#[test]
fn two_cell_cycle_is_rejected() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=B1");

    assert_eq!(
        sheet.set_cell(pos("B1"), "=A1"),
        Err(SheetError::CircularDependency(pos("B1")))
    );

    // B1 was materialized as an empty placeholder by the first edit and the
    // failed edit did not change it
    let b1 = sheet.get_cell(pos("B1")).unwrap().unwrap();
    assert_eq!(b1.text(), "");
    assert_eq!(value(&sheet, "B1"), CellValue::Empty);
    assert_eq!(value(&sheet, "A1"), CellValue::Number(0.0));
}

#[test]
fn longer_cycle_is_rejected_and_state_preserved() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=B1");
    set(&mut sheet, "B1", "=C1");
    set(&mut sheet, "C1", "5");

    let texts_before = texts_output(&sheet);

    // C1 = A1 would close A1 -> B1 -> C1 -> A1
    assert_eq!(
        sheet.set_cell(pos("C1"), "=A1"),
        Err(SheetError::CircularDependency(pos("C1")))
    );

    assert_eq!(texts_output(&sheet), texts_before);
    assert_eq!(value(&sheet, "A1"), CellValue::Number(5.0));
}

#[test]
fn division_by_zero_is_a_value_not_an_error() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=2/0");

    assert_eq!(
        value(&sheet, "A1"),
        CellValue::Error(CellError::DivisionByZero)
    );
    assert_eq!(text(&sheet, "A1"), "=2/0");
}

#[test]
fn error_values_propagate_through_references() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=1/0");
    set(&mut sheet, "B1", "=A1+1");

    assert_eq!(
        value(&sheet, "B1"),
        CellValue::Error(CellError::DivisionByZero)
    );
}

#[test]
fn referencing_text_is_a_value_error() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "note");
    set(&mut sheet, "B1", "=A1*2");

    assert_eq!(value(&sheet, "B1"), CellValue::Error(CellError::InvalidValue));
}

#[test]
fn canonical_reprint_and_precedence() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "=1+2*3");
    assert_eq!(text(&sheet, "A1"), "=1+2*3");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(7.0));

    set(&mut sheet, "A1", "=(1+2)*3");
    assert_eq!(text(&sheet, "A1"), "=(1+2)*3");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(9.0));

    set(&mut sheet, "A1", "=1-(2-3)");
    assert_eq!(text(&sheet, "A1"), "=1-(2-3)");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(2.0));

    set(&mut sheet, "A1", "=1-(2+3)");
    assert_eq!(text(&sheet, "A1"), "=1-(2+3)");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(-4.0));
}

#[test]
fn reprinted_formula_text_is_stable() {
    let mut sheet = Sheet::new();

    for input in ["=((1+2))*3", "= 1 + 2", "=-(A1+B1)/2", "=+(1-2)"] {
        set(&mut sheet, "C1", input);
        let printed = text(&sheet, "C1");
        set(&mut sheet, "C2", &printed);
        assert_eq!(text(&sheet, "C2"), printed, "input {:?}", input);
    }
}

#[test]
fn escaped_text_and_number_trimming() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "'hello");
    assert_eq!(text(&sheet, "A1"), "'hello");
    assert_eq!(value(&sheet, "A1"), CellValue::Text("hello".to_string()));

    set(&mut sheet, "A2", "3.140");
    assert_eq!(text(&sheet, "A2"), "3.14");
    assert_eq!(value(&sheet, "A2"), CellValue::Number(3.14));
}

#[test]
fn invalidation_follows_edits_and_clears() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "=B1");
    set(&mut sheet, "B1", "10");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(10.0));

    set(&mut sheet, "B1", "20");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(20.0));

    sheet.clear_cell(pos("B1")).unwrap();
    assert_eq!(value(&sheet, "A1"), CellValue::Number(0.0));
}

#[test]
fn invalidation_is_transitive() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "1");
    set(&mut sheet, "B1", "=A1+1");
    set(&mut sheet, "C1", "=B1+1");
    set(&mut sheet, "D1", "=C1+1");

    // Populate every cache
    assert_eq!(value(&sheet, "D1"), CellValue::Number(4.0));

    set(&mut sheet, "A1", "10");
    assert_eq!(value(&sheet, "B1"), CellValue::Number(11.0));
    assert_eq!(value(&sheet, "C1"), CellValue::Number(12.0));
    assert_eq!(value(&sheet, "D1"), CellValue::Number(13.0));
}

#[test]
fn cached_values_match_fresh_evaluation() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "2");
    set(&mut sheet, "B1", "=A1*A1");
    set(&mut sheet, "C1", "=B1+A1");

    // First read populates caches, second read serves them; both must agree
    // with evaluating the same content on a freshly built sheet.
    let first = (value(&sheet, "B1"), value(&sheet, "C1"));
    let second = (value(&sheet, "B1"), value(&sheet, "C1"));
    assert_eq!(first, second);

    let mut fresh = Sheet::new();
    set(&mut fresh, "A1", "2");
    set(&mut fresh, "B1", "=A1*A1");
    set(&mut fresh, "C1", "=B1+A1");
    assert_eq!(first, (value(&fresh, "B1"), value(&fresh, "C1")));
}

#[test]
fn out_of_range_reference_fails_the_edit() {
    let mut sheet = Sheet::new();

    // XFD is the last in-range column
    set(&mut sheet, "A1", "=XFD1");
    assert_eq!(text(&sheet, "A1"), "=XFD1");

    assert!(matches!(
        sheet.set_cell(pos("A2"), "=ZZZZZ1"),
        Err(SheetError::Formula(FormulaError::InvalidReference(_)))
    ));
    assert!(matches!(
        sheet.set_cell(pos("A2"), "=A16385"),
        Err(SheetError::Formula(FormulaError::InvalidReference(_)))
    ));
    assert!(sheet.get_cell(pos("A2")).unwrap().is_none());
}

#[test]
fn rollback_on_parse_failure() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=1+2");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(3.0));

    for bad in ["=1+", "=(1", "=1e999", "=lower1", "=ZZZZZ1"] {
        assert!(sheet.set_cell(pos("A1"), bad).is_err(), "input {:?}", bad);
        assert_eq!(text(&sheet, "A1"), "=1+2");
        assert_eq!(value(&sheet, "A1"), CellValue::Number(3.0));
    }
}

#[test]
fn failed_edit_keeps_graph_intact() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "5");
    set(&mut sheet, "B1", "=A1");
    assert_eq!(value(&sheet, "B1"), CellValue::Number(5.0));

    // A failed re-edit of B1 must not detach B1 from A1
    assert!(sheet.set_cell(pos("B1"), "=C1+").is_err());
    set(&mut sheet, "A1", "6");
    assert_eq!(value(&sheet, "B1"), CellValue::Number(6.0));
}

#[test]
fn invalid_positions_are_errors() {
    let mut sheet = Sheet::new();

    assert_eq!(
        sheet.set_cell(Position::NONE, "1"),
        Err(SheetError::InvalidPosition(Position::NONE))
    );
    assert_eq!(
        sheet.get_cell(Position::new(-1, 0)),
        Err(SheetError::InvalidPosition(Position::new(-1, 0)))
    );
    assert_eq!(
        sheet.clear_cell(Position::new(0, 16_384)),
        Err(SheetError::InvalidPosition(Position::new(0, 16_384)))
    );
}

#[test]
fn setting_identical_text_is_a_no_op() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=B1+1");
    set(&mut sheet, "B1", "1");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(2.0));

    // Re-setting the same text must succeed without rebuilding anything
    set(&mut sheet, "A1", "=B1+1");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(2.0));
}

#[test]
fn clear_cell_is_idempotent_and_unhooks_dependents() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "7");
    set(&mut sheet, "B1", "=A1");
    assert_eq!(value(&sheet, "B1"), CellValue::Number(7.0));

    sheet.clear_cell(pos("A1")).unwrap();
    assert_eq!(value(&sheet, "B1"), CellValue::Number(0.0));
    assert!(sheet.get_cell(pos("A1")).unwrap().is_none());

    // Clearing again, or clearing a never-set cell, is a no-op
    sheet.clear_cell(pos("A1")).unwrap();
    sheet.clear_cell(pos("J9")).unwrap();

    // A1 can come back and dependents recompute
    set(&mut sheet, "A1", "3");
    assert_eq!(value(&sheet, "B1"), CellValue::Number(3.0));
}

#[test]
fn printable_size_tracks_occupied_cells() {
    let mut sheet = Sheet::new();
    assert_eq!(sheet.printable_size(), Size { rows: 0, cols: 0 });

    set(&mut sheet, "B2", "x");
    assert_eq!(sheet.printable_size(), Size { rows: 2, cols: 2 });

    set(&mut sheet, "D1", "y");
    assert_eq!(sheet.printable_size(), Size { rows: 2, cols: 4 });

    sheet.clear_cell(pos("B2")).unwrap();
    assert_eq!(sheet.printable_size(), Size { rows: 1, cols: 4 });

    sheet.clear_cell(pos("D1")).unwrap();
    assert_eq!(sheet.printable_size(), Size { rows: 0, cols: 0 });
}

#[test]
fn referenced_cells_count_as_occupied() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "=C3");

    // C3 was materialized as an empty cell, so the grid extends to it
    assert_eq!(sheet.printable_size(), Size { rows: 3, cols: 3 });
    assert!(sheet.get_cell(pos("C3")).unwrap().is_some());
}

#[test]
fn print_values_and_texts() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "A1", "1");
    set(&mut sheet, "B1", "2");
    set(&mut sheet, "C1", "=A1+B1");
    set(&mut sheet, "A2", "'esc");
    set(&mut sheet, "C2", "=1/0");

    assert_eq!(values_output(&sheet), "1\t2\t3\nesc\t\t#DIV/0!\n");
    assert_eq!(texts_output(&sheet), "1\t2\t=A1+B1\n'esc\t\t=1/0\n");
}

#[test]
fn print_skips_gap_cells() {
    let mut sheet = Sheet::new();
    set(&mut sheet, "B2", "middle");

    assert_eq!(values_output(&sheet), "\t\n\tmiddle\n");
    assert_eq!(texts_output(&sheet), "\t\n\tmiddle\n");
}

#[test]
fn empty_sheet_prints_nothing() {
    let sheet = Sheet::new();
    assert_eq!(values_output(&sheet), "");
    assert_eq!(texts_output(&sheet), "");
}

#[test]
fn text_cell_referenced_as_empty_after_replacement() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "=B1");
    set(&mut sheet, "B1", "note");
    assert_eq!(value(&sheet, "A1"), CellValue::Error(CellError::InvalidValue));

    set(&mut sheet, "B1", "");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(0.0));
}

#[test]
fn replacing_a_formula_rewires_dependencies() {
    let mut sheet = Sheet::new();

    set(&mut sheet, "A1", "1");
    set(&mut sheet, "B1", "2");
    set(&mut sheet, "C1", "=A1");
    assert_eq!(value(&sheet, "C1"), CellValue::Number(1.0));

    set(&mut sheet, "C1", "=B1");
    assert_eq!(value(&sheet, "C1"), CellValue::Number(2.0));

    // Edits to A1 no longer touch C1; edits to B1 do
    set(&mut sheet, "A1", "100");
    assert_eq!(value(&sheet, "C1"), CellValue::Number(2.0));
    set(&mut sheet, "B1", "200");
    assert_eq!(value(&sheet, "C1"), CellValue::Number(200.0));

    // And the old edge is really gone: A1 = C1 is no longer a cycle
    set(&mut sheet, "A1", "=C1");
    assert_eq!(value(&sheet, "A1"), CellValue::Number(200.0));
}
