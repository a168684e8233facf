//! Behavioural properties of the load and query pipeline, exercised through
//! the public API only.

use std::fs;

use poaf_loader::{
    discover_data_files, load_from_bytes, load_from_directory, parse_annotations,
    parse_ontology, HeaderDetection, LoadConfig, OboConfig, PafConfig, PoafError, ProteinIndex,
};

const ONTOLOGY: &str = r#"format-version: 1.2
data-version: pr/releases/2024-05-01
ontology: pr

[Term]
id: PR:000000001
name: protein
def: "An amino acid chain that is produced de novo by ribosome-mediated translation." [PMID:123]

[Term]
id: PR:000000650
name: mitogen-activated protein kinase 1
def: "A MAP kinase that phosphorylates transcription factors." [PMID:456]
synonym: "ERK2" EXACT []
synonym: "MAPK1" EXACT []
is_a: PR:000000001 ! protein

[Term]
id: PR:000000651
name: Kinase Suppressor of Ras 1
synonym: "KSR1" EXACT []
is_a: PR:000000001 ! protein
relationship: interacts_with PR:000000650

[Term]
id: PR:000000700
name: histone H3
def: "A core histone, not a KINASE." []
is_a: PR:000000001

[Typedef]
id: interacts_with
name: interacts with
"#;

const ANNOTATIONS: &str = "PRO_ID\tObject_term\tObject_syny\tModifier\tRelation\tOntology_ID\tOntology_term\n\
PR:000000650\tMAPK1\tERK2\t\tlocated_in\tGO:0005634\tnucleus\n\
PR:000000651\tKSR1\t\t\tenables\tGO:0005515\tprotein binding\n\
PR:000000700\thistone H3\t\t\tlocated_in\tGO:0000786\tnucleosome\n";

fn load(ontology: &str, annotations: &str) -> ProteinIndex {
    let (index, _) =
        load_from_bytes(ontology.as_bytes(), annotations.as_bytes(), &LoadConfig::default())
            .unwrap();
    index
}

fn ids<'a>(terms: impl IntoIterator<Item = &'a poaf_types::Term>) -> Vec<&'a str> {
    terms.into_iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn every_parsed_term_is_found_by_its_id() {
    let parsed = parse_ontology(ONTOLOGY, &OboConfig::default());
    let expected = parsed.terms.clone();
    let index = load(ONTOLOGY, "");

    assert_eq!(expected.len(), 4);
    for term in &expected {
        assert_eq!(index.get_term_by_id(&term.id), Some(term));
    }
    assert!(index.get_term_by_id("PR:999999999").is_none());
}

#[test]
fn keyword_search_returns_exactly_the_matching_terms() {
    // A term with no name, definition or synonym has no text to match.
    let ontology = format!("{ONTOLOGY}\n[Term]\nid: PR:000000999\n");
    let index = load(&ontology, ANNOTATIONS);

    let queries = ["kinase", "KINASE", "erk", "protein", "chain", "ras 1", "nothing-here", "a", ""];
    for query in queries {
        let needle = query.to_lowercase();
        let expected: Vec<&str> = index
            .terms()
            .filter(|term| {
                term.text_fields()
                    .any(|f| !f.is_empty() && f.to_lowercase().contains(&needle))
            })
            .map(|term| term.id.as_str())
            .collect();

        assert_eq!(ids(index.find_terms_by_keyword(query)), expected, "query {query:?}");
    }

    assert_eq!(index.term_count(), 5);
    assert_eq!(index.find_terms_by_keyword("").len(), 4);
    assert!(index.find_terms_by_keyword("").iter().all(|t| t.id != "PR:000000999"));
}

#[test]
fn keyword_search_ignores_ids_and_relationships() {
    let index = load(ONTOLOGY, ANNOTATIONS);

    assert!(index.find_terms_by_keyword("PR:000000650").is_empty());
    assert!(index.find_terms_by_keyword("interacts_with").is_empty());
}

#[test]
fn keyword_search_is_case_insensitive() {
    let index = load(ONTOLOGY, ANNOTATIONS);

    let lower = ids(index.find_terms_by_keyword("kinase"));
    let upper = ids(index.find_terms_by_keyword("KINASE"));
    let mixed = ids(index.find_terms_by_keyword("KiNaSe"));

    assert_eq!(lower, vec!["PR:000000650", "PR:000000651", "PR:000000700"]);
    assert_eq!(lower, upper);
    assert_eq!(lower, mixed);
}

#[test]
fn repeated_id_takes_the_later_stanza() {
    let text = "[Term]\nid: PR:1\nname: first\n\n[Term]\nid: PR:2\nname: other\n\n[Term]\nid: PR:1\nname: second\n";
    let (index, report) =
        load_from_bytes(text.as_bytes(), b"", &LoadConfig::default()).unwrap();

    assert_eq!(index.get_term_by_id("PR:1").unwrap().name.as_deref(), Some("second"));
    assert_eq!(index.term_count(), 2);
    assert_eq!(report.ontology.duplicate_ids, 1);
    assert!(index.find_terms_by_keyword("first").is_empty());
}

#[test]
fn stanza_without_id_is_skipped_alone() {
    let text = "[Term]\nid: PR:A\nname: alpha\n\n[Term]\nname: beta\nis_a: PR:A\n\n[Term]\nid: PR:C\nname: gamma\n";
    let (index, report) =
        load_from_bytes(text.as_bytes(), b"", &LoadConfig::default()).unwrap();

    assert_eq!(ids(index.terms()), vec!["PR:A", "PR:C"]);
    assert_eq!(report.ontology.stanzas_skipped, 1);
    assert_eq!(index.get_term_by_id("PR:A").unwrap().name.as_deref(), Some("alpha"));
    assert!(index.get_term_by_id("PR:C").unwrap().relationships.is_empty());
    assert!(index.find_terms_by_keyword("beta").is_empty());
}

#[test]
fn protein_rows_keep_input_order() {
    let rows = [
        "P2\tx",
        "P3\tx",
        "P1\tfirst",
        "P2\tx",
        "P3\tx",
        "P2\tx",
        "P1\tsecond",
        "P3\tx",
        "P1\tthird",
    ];
    let text = rows.join("\n");
    let index = load("", &text);

    let p1 = index.get_annotations_for_protein("P1");
    let terms: Vec<&str> = p1.iter().map(|a| a.object_term.as_str()).collect();
    let lines: Vec<usize> = p1.iter().map(|a| a.line_number).collect();

    assert_eq!(terms, vec!["first", "second", "third"]);
    assert_eq!(lines, vec![3, 7, 9]);
    assert_eq!(index.protein_count(), 3);
}

#[test]
fn empty_inputs_load_as_empty_index() {
    let (index, report) = load_from_bytes(b"", b"", &LoadConfig::default()).unwrap();

    assert_eq!(index.term_count(), 0);
    assert_eq!(index.annotation_count(), 0);
    assert_eq!(report.ontology.terms_loaded, 0);
    assert_eq!(report.ontology.stanzas_skipped, 0);
    assert_eq!(report.annotations.rows_read, 0);
    assert_eq!(report.annotations.rows_accepted, 0);
    assert_eq!(report.annotations.rows_skipped, 0);
    assert_eq!(report.annotations.rows_degraded, 0);
    assert!(index.find_terms_by_keyword("kinase").is_empty());
    assert!(index.get_annotations_for_protein("P1").is_empty());
}

#[test]
fn row_with_only_protein_id_is_kept() {
    let text = "PR:000000650\tMAPK1\tERK2\nPR:000000999\n";
    let (index, report) =
        load_from_bytes(b"", text.as_bytes(), &LoadConfig::default()).unwrap();

    let rows = index.get_annotations_for_protein("PR:000000999");
    assert_eq!(rows.len(), 1);
    assert!(rows[0].degraded);
    assert!(rows[0].object_term.is_empty());
    assert_eq!(rows[0].descriptive_text().count(), 0);

    assert_eq!(report.annotations.rows_accepted, 2);
    assert_eq!(report.annotations.rows_skipped, 0);
    assert_eq!(report.annotations.rows_degraded, 2);
}

#[test]
fn blank_and_comment_lines_are_not_malformed() {
    let text = "# generated 2024-05-01\n\nPRO_ID\tObject_term\n\nPR:1\tkinase\n# trailing\n\tno id\n";
    let parsed = parse_annotations(text, &PafConfig::default());

    assert!(parsed.stats.header_detected);
    assert_eq!(parsed.stats.blank_lines, 2);
    assert_eq!(parsed.stats.comment_lines, 2);
    assert_eq!(parsed.stats.rows_read, 2);
    assert_eq!(parsed.stats.rows_accepted, 1);
    assert_eq!(parsed.stats.rows_skipped, 1);
}

#[test]
fn unknown_header_is_read_as_data_unless_forced() {
    let text = "Protein\tName\nPR:1\tkinase\n";

    let auto = parse_annotations(text, &PafConfig::default());
    assert!(!auto.stats.header_detected);
    assert_eq!(auto.annotations.len(), 2);
    assert_eq!(auto.annotations[0].protein_id, "Protein");

    let forced = parse_annotations(
        text,
        &PafConfig {
            header: HeaderDetection::Always,
            ..Default::default()
        },
    );
    assert!(forced.stats.header_detected);
    assert_eq!(forced.annotations.len(), 1);
    assert_eq!(forced.annotations[0].protein_id, "PR:1");
}

#[test]
fn annotation_keyword_search_covers_descriptive_text() {
    let index = load(ONTOLOGY, ANNOTATIONS);

    let hits: Vec<&str> = index
        .find_annotations_by_keyword("NUCLE")
        .iter()
        .map(|a| a.protein_id.as_str())
        .collect();
    assert_eq!(hits, vec!["PR:000000650", "PR:000000700"]);

    assert!(index.find_annotations_by_keyword("GO:0005634").is_empty());
    assert_eq!(index.find_annotations_by_keyword("").len(), index.annotation_count());
}

#[test]
fn dangling_edges_are_kept_and_reported() {
    let text = "[Term]\nid: PR:1\nname: one\nis_a: PR:404\nis_a: PR:2\n\n[Term]\nid: PR:2\nname: two\n";
    let (index, report) =
        load_from_bytes(text.as_bytes(), b"", &LoadConfig::default()).unwrap();

    assert_eq!(report.dangling_edges, 1);
    assert_eq!(index.get_parents("PR:1"), vec!["PR:404", "PR:2"]);
    assert_eq!(index.get_children("PR:2"), vec!["PR:1"]);

    let resolved = index.resolve_relationships("PR:1").unwrap();
    assert!(resolved[0].is_dangling());
    assert_eq!(resolved[1].target.map(|t| t.label()), Some("two"));
}

#[test]
fn load_from_directory_finds_both_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pr.obo"), ONTOLOGY).unwrap();
    fs::write(dir.path().join("PAF.txt"), ANNOTATIONS).unwrap();
    fs::write(dir.path().join("README"), "not data").unwrap();

    let files = discover_data_files(dir.path()).unwrap();
    assert!(files.has_required_files());

    let (index, report) = load_from_directory(dir.path(), &LoadConfig::default()).unwrap();
    assert_eq!(index.term_count(), 4);
    assert_eq!(index.annotation_count(), 3);
    assert_eq!(report.annotations.rows_accepted, 3);
}

#[test]
fn load_from_directory_reports_missing_annotation_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("pr.obo"), ONTOLOGY).unwrap();

    let err = load_from_directory(dir.path(), &LoadConfig::default()).unwrap_err();
    match err {
        PoafError::RequiredFileMissing { file_type, .. } => assert_eq!(file_type, "Annotation"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn index_is_shareable_across_threads() {
    let index = std::sync::Arc::new(load(ONTOLOGY, ANNOTATIONS));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = std::sync::Arc::clone(&index);
            std::thread::spawn(move || index.find_terms_by_keyword("kinase").len())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
}
