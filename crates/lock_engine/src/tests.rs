//! End-to-end tests: document bytes in, locked document bytes out
//!
//! Fixtures are assembled in memory with the package codec.

#[cfg(test)]
mod integration_tests {
    use crate::*;
    use doc_model::content_control::region_id;
    use doc_model::protection::{DocumentProtection, ProtectionType};
    use doc_model::table::table_cells;
    use doc_model::wordml::{tags, W_NS};
    use doc_model::XmlTree;
    use grid_model::{CellValue, GridSource, DEFAULT_CELL_LIMIT};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use store::docx::DocxPackage;
    use store::xlsx::XlsxWorkbook;
    use store::PartMap;

    /// Two-sheet legacy workbook; the first sheet, "Form", has a blank first
    /// row, then `["Name:", "", 42.5]` and `[TRUE, "  ", 0]`
    const LEGACY_FORM: &[u8] = include_bytes!("../../../fixtures/xls/legacy_form.xls");

    const W_DECL: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn content_types(overrides: &[(&str, &str)]) -> Vec<u8> {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
        );
        for (part, ct) in overrides {
            xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, ct));
        }
        xml.push_str("</Types>");
        xml.into_bytes()
    }

    fn root_rels(target: &str) -> Vec<u8> {
        format!(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="{}"/></Relationships>"#,
            target
        )
        .into_bytes()
    }

    /// Paragraph with one run per text
    fn paragraph(texts: &[&str]) -> String {
        let runs: String = texts
            .iter()
            .map(|t| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, t))
            .collect();
        format!("<w:p>{}</w:p>", runs)
    }

    /// One table; each cell holds a single paragraph with the given text
    fn table(rows: &[Vec<&str>]) -> String {
        let mut xml = String::from("<w:tbl><w:tblPr/>");
        for row in rows {
            xml.push_str("<w:tr>");
            for text in row {
                let texts: Vec<&str> = if text.is_empty() { vec![] } else { vec![*text] };
                xml.push_str(&format!("<w:tc><w:tcPr/>{}</w:tc>", paragraph(&texts)));
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        xml
    }

    fn docx(body: &str, settings: Option<&str>) -> Vec<u8> {
        let mut parts = PartMap::new();
        parts.insert(
            "[Content_Types].xml",
            content_types(&[(
                "/word/document.xml",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
            )]),
        );
        parts.insert("_rels/.rels", root_rels("word/document.xml"));
        parts.insert(
            "word/document.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                W_DECL, body
            )
            .into_bytes(),
        );
        if let Some(settings) = settings {
            parts.insert(
                "word/_rels/document.xml.rels",
                br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/></Relationships>"#.to_vec(),
            );
            parts.insert(
                "word/settings.xml",
                format!(r#"<w:settings {}>{}</w:settings>"#, W_DECL, settings).into_bytes(),
            );
        }
        parts.insert("word/media/logo.bin", vec![0, 159, 146, 150]);
        parts.pack().unwrap()
    }

    fn shared_strings(strings: &[&str]) -> Vec<u8> {
        let items: String = strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", s))
            .collect();
        format!(
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
            strings.len(),
            items
        )
        .into_bytes()
    }

    /// Workbook with one sheet; `cells` are raw `<c>` elements per row
    fn xlsx(rows: &[&str], strings: &[&str]) -> Vec<u8> {
        let mut parts = PartMap::new();
        parts.insert(
            "[Content_Types].xml",
            content_types(&[
                (
                    "/xl/workbook.xml",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                ),
                (
                    "/xl/worksheets/sheet1.xml",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
                ),
            ]),
        );
        parts.insert("_rels/.rels", root_rels("xl/workbook.xml"));
        parts.insert(
            "xl/workbook.xml",
            br#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_vec(),
        );
        parts.insert(
            "xl/_rels/workbook.xml.rels",
            br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#.to_vec(),
        );
        parts.insert("xl/styles.xml", store::xlsx::MINIMAL_STYLES.as_bytes().to_vec());
        parts.insert("xl/sharedStrings.xml", shared_strings(strings));
        let data: String = rows
            .iter()
            .enumerate()
            .map(|(i, cells)| format!(r#"<row r="{}">{}</row>"#, i + 1, cells))
            .collect();
        parts.insert(
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#,
                data
            )
            .into_bytes(),
        );
        parts.pack().unwrap()
    }

    /// `[["A", 1], ["", None]]`
    fn two_by_two_xlsx() -> Vec<u8> {
        xlsx(
            &[
                r#"<c r="A1" t="s"><v>0</v></c><c r="B1"><v>1</v></c>"#,
                r#"<c r="A2" t="s"><v>1</v></c>"#,
            ],
            &["A", ""],
        )
    }

    fn regions(tree: &XmlTree) -> Vec<u32> {
        tree.descendants(tree.root())
            .filter(|&id| tree.is_element(id, W_NS, tags::SDT))
            .filter_map(|id| region_id(tree, id))
            .collect()
    }

    struct LegacyRows(Vec<Vec<CellValue>>);

    impl GridSource for LegacyRows {
        fn sheet_name(&self) -> &str {
            "Sheet1"
        }

        fn dimensions(&self) -> (u32, u32) {
            let cols = self.0.iter().map(Vec::len).max().unwrap_or(0);
            (self.0.len() as u32, cols as u32)
        }

        fn value_at(&self, row: u32, col: u32) -> CellValue {
            self.0
                .get(row as usize)
                .and_then(|r| r.get(col as usize))
                .cloned()
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_word_one_row_two_cells() {
        let input = docx(&table(&[vec!["Name:", ""]]), None);
        let outcome = Locker::default()
            .protect(&input, DocumentKind::WordProcessing)
            .unwrap();

        assert_eq!(outcome.counts.empty_count, 1);
        assert_eq!(outcome.counts.filled_count, 1);

        let package = DocxPackage::open(&outcome.bytes).unwrap();
        let doc = package.document();
        assert_eq!(regions(doc), vec![1_000_000]);

        // the region sits in the second cell, around its first paragraph
        let cells = table_cells(doc, doc.root());
        let second = cells[1].cell;
        let sdt = doc
            .children(second)
            .iter()
            .copied()
            .find(|&c| doc.is_element(c, W_NS, tags::SDT))
            .unwrap();
        assert_eq!(doc.index_in_parent(sdt), Some(1));
        assert!(doc.descendants(cells[0].cell).all(|id| !doc.is_element(id, W_NS, tags::SDT)));

        let protection = DocumentProtection::read(package.settings()).unwrap();
        assert_eq!(protection.protection_type, ProtectionType::FormFieldsOnly);
        assert!(protection.enforced);

        // other parts pass through
        let parts = PartMap::extract(&outcome.bytes).unwrap();
        assert_eq!(parts.get("word/media/logo.bin"), Some(&[0u8, 159, 146, 150][..]));
    }

    #[test]
    fn test_word_existing_protection_is_replaced() {
        let input = docx(
            &table(&[vec![""]]),
            Some(r#"<w:zoom w:percent="90"/><w:documentProtection w:edit="readOnly" w:enforcement="1"/>"#),
        );
        let outcome = Locker::default()
            .protect(&input, DocumentKind::WordProcessing)
            .unwrap();

        let package = DocxPackage::open(&outcome.bytes).unwrap();
        assert!(!package.settings_synthesized());
        let xml = String::from_utf8(store::xml::write_xml(package.settings())).unwrap();
        assert_eq!(xml.matches("documentProtection").count(), 1);
        assert!(xml.contains(
            r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:documentProtection w:edit="forms" w:enforcement="1"/><w:zoom w:percent="90"/></w:settings>"#
        ));
    }

    #[test]
    fn test_word_region_ids_follow_options() {
        let input = docx(&table(&[vec!["", "x", ""], vec!["", " ", "y"]]), None);
        let locker = Locker::new(LockOptions {
            region_id_base: 42,
            ..LockOptions::default()
        });
        let outcome = locker.protect(&input, DocumentKind::WordProcessing).unwrap();

        assert_eq!(outcome.counts.empty_count, 4);
        assert_eq!(outcome.counts.filled_count, 2);
        let package = DocxPackage::open(&outcome.bytes).unwrap();
        assert_eq!(regions(package.document()), vec![42, 43, 44, 45]);
    }

    #[test]
    fn test_word_relock_is_stable() {
        let input = docx(&table(&[vec!["Name:", ""], vec!["", "Date"]]), None);
        let locker = Locker::default();
        let first = locker.protect(&input, DocumentKind::WordProcessing).unwrap();
        let second = locker.protect(&first.bytes, DocumentKind::WordProcessing).unwrap();

        assert_eq!(first.counts, second.counts);
        let package = DocxPackage::open(&second.bytes).unwrap();
        assert_eq!(regions(package.document()).len(), 2);
    }

    #[test]
    fn test_word_analyze_changes_nothing() {
        let input = docx(&table(&[vec!["Name:", ""]]), None);
        let counts = Locker::default()
            .analyze(&input, DocumentKind::WordProcessing)
            .unwrap();
        assert_eq!(
            counts,
            CellCounts {
                empty_count: 1,
                filled_count: 1
            }
        );
    }

    #[test]
    fn test_spreadsheet_two_by_two() {
        let outcome = Locker::default()
            .protect(&two_by_two_xlsx(), DocumentKind::Spreadsheet)
            .unwrap();
        assert_eq!(outcome.counts.empty_count, 2);
        assert_eq!(outcome.counts.filled_count, 2);

        let workbook = XlsxWorkbook::open(&outcome.bytes).unwrap();
        let grid = workbook.read_grid(DEFAULT_CELL_LIMIT).unwrap();
        assert!(grid.protection().enabled);
        assert!(grid.cell(1, 1).unwrap().protection.locked);
        assert!(grid.cell(1, 2).unwrap().protection.locked);
        assert!(!grid.cell(2, 1).unwrap().protection.locked);
        assert!(!grid.cell(2, 2).unwrap().protection.locked);
        // values survive
        assert_eq!(grid.cell(1, 1).unwrap().value, CellValue::from("A"));
        assert_eq!(grid.cell(1, 2).unwrap().value, CellValue::Number(1.0));
    }

    #[test]
    fn test_spreadsheet_sheet_protection_markup() {
        let outcome = Locker::default()
            .protect(&two_by_two_xlsx(), DocumentKind::Spreadsheet)
            .unwrap();
        let parts = PartMap::extract(&outcome.bytes).unwrap();
        let sheet = String::from_utf8(parts.get("xl/worksheets/sheet1.xml").unwrap().to_vec()).unwrap();
        assert!(sheet.contains(
            r#"</sheetData><sheetProtection sheet="1" objects="1" scenarios="1"/><pageMargins"#
        ));
    }

    #[test]
    fn test_legacy_matches_native_counts() {
        let source = LegacyRows(vec![
            vec![CellValue::from("A"), CellValue::Number(1.0)],
            vec![CellValue::from(""), CellValue::Empty],
        ]);
        let (grid, report) = sheet::transform_source(&source, DEFAULT_CELL_LIMIT).unwrap();

        let native = Locker::default()
            .analyze(&two_by_two_xlsx(), DocumentKind::Spreadsheet)
            .unwrap();
        assert_eq!(report.empty_count, native.empty_count);
        assert_eq!(report.filled_count, native.filled_count);
        assert_eq!(grid.extent(), (2, 2));

        // the materialized grid is written as a fresh native workbook
        let bytes = store::xlsx::write_new_workbook(&grid).unwrap();
        let reread = XlsxWorkbook::open(&bytes).unwrap().read_grid(DEFAULT_CELL_LIMIT).unwrap();
        assert!(reread.protection().enabled);
        assert!(!reread.cell(2, 2).unwrap().protection.locked);
        assert!(reread.cell(1, 2).unwrap().protection.locked);
    }

    #[test]
    fn test_legacy_workbook_locked_into_native() {
        let outcome = Locker::default()
            .protect(LEGACY_FORM, DocumentKind::LegacySpreadsheet)
            .unwrap();
        assert_eq!(
            outcome.counts,
            CellCounts {
                empty_count: 5,
                filled_count: 4
            }
        );
        assert_eq!(outcome.kind.output_extension(), "xlsx");

        let workbook = XlsxWorkbook::open(&outcome.bytes).unwrap();
        assert_eq!(workbook.sheet_name(), "Form");
        let grid = workbook.read_grid(DEFAULT_CELL_LIMIT).unwrap();
        assert_eq!(grid.extent(), (3, 3));
        assert!(grid.protection().enabled);
        for (position, cell) in grid.cells() {
            assert_eq!(
                cell.protection.locked,
                !cell.value.is_empty_cell(),
                "{} holds {:?}",
                position,
                cell.value
            );
        }
        assert_eq!(grid.cell(2, 1).unwrap().value, CellValue::from("Name:"));
        assert_eq!(grid.cell(3, 3).unwrap().value, CellValue::Number(0.0));
        assert!(grid.cell(3, 3).unwrap().protection.locked);

        let parts = PartMap::extract(&outcome.bytes).unwrap();
        let sheet = String::from_utf8(parts.get(workbook.sheet_part_path()).unwrap().to_vec()).unwrap();
        assert!(sheet.contains(r#"<sheetProtection sheet="1" objects="1" scenarios="1"/>"#));
    }

    #[test]
    fn test_legacy_analyze_matches_protect() {
        let counts = Locker::default()
            .analyze(LEGACY_FORM, DocumentKind::LegacySpreadsheet)
            .unwrap();
        let outcome = Locker::default()
            .protect(LEGACY_FORM, DocumentKind::LegacySpreadsheet)
            .unwrap();
        assert_eq!(counts, outcome.counts);
    }

    #[test]
    fn test_far_corner_reference_is_malformed_input() {
        let input = xlsx(&[r#"<c r="XFD1048576"><v>1</v></c>"#], &[]);
        let locker = Locker::default();
        let err = locker.protect(&input, DocumentKind::Spreadsheet).unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)), "{:?}", err);
        let err = locker.analyze(&input, DocumentKind::Spreadsheet).unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)));
    }

    #[test]
    fn test_cell_limit_follows_options() {
        let locker = Locker::new(LockOptions {
            max_cells: 3,
            ..LockOptions::default()
        });
        let err = locker
            .protect(&two_by_two_xlsx(), DocumentKind::Spreadsheet)
            .unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)));
        let err = locker
            .protect(LEGACY_FORM, DocumentKind::LegacySpreadsheet)
            .unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)));
    }

    #[test]
    fn test_invalid_cell_reference_is_malformed_input() {
        let input = xlsx(&[r#"<c r="A0"><v>1</v></c>"#], &[]);
        let err = Locker::default()
            .protect(&input, DocumentKind::Spreadsheet)
            .unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)), "{:?}", err);
    }

    #[test]
    fn test_corrupted_input_yields_no_output() {
        let locker = Locker::default();
        for kind in DocumentKind::ALL {
            let err = locker.protect(b"\x00\x01 definitely not a document", kind).unwrap_err();
            assert!(
                matches!(err, LockError::MalformedInput(_) | LockError::CodecFailure { .. }),
                "{:?} gave {:?}",
                kind,
                err
            );
        }
    }

    #[test]
    fn test_broken_document_part_is_malformed_input() {
        let mut parts = PartMap::extract(&docx(&table(&[vec![""]]), None)).unwrap();
        parts.insert("word/document.xml", b"<w:document><w:body><w:tbl>".to_vec());
        let err = Locker::default()
            .protect(&parts.pack().unwrap(), DocumentKind::WordProcessing)
            .unwrap_err();
        assert!(matches!(err, LockError::MalformedInput(_)));
    }

    #[test]
    fn test_declared_kind_checked_first() {
        let err = Locker::default().protect_declared(b"", "pdf").unwrap_err();
        assert!(matches!(err, LockError::UnsupportedKind(_)));
        assert_eq!(err.kind(), "unsupported_kind");
    }

    fn cell_text() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(""), Just(" "), Just("x"), Just("Name:"), Just("  0 ")]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_word_counts_and_regions(rows in proptest::collection::vec(proptest::collection::vec(cell_text(), 1..4), 1..4)) {
            let expected_empty = rows.iter().flatten().filter(|t| t.trim().is_empty()).count();
            let total: usize = rows.iter().map(Vec::len).sum();

            let input = docx(&table(&rows), None);
            let outcome = Locker::default().protect(&input, DocumentKind::WordProcessing).unwrap();
            prop_assert_eq!(outcome.counts.total(), total);
            prop_assert_eq!(outcome.counts.empty_count, expected_empty);

            let package = DocxPackage::open(&outcome.bytes).unwrap();
            let ids = regions(package.document());
            prop_assert_eq!(ids.len(), expected_empty);
            let unique: HashSet<u32> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
