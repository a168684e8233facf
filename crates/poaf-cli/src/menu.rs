//! Interactive text menu.
//!
//! Reads commands line by line and writes plain text, so it runs the same
//! against a terminal or an in-memory buffer.

use std::fmt;
use std::io::{self, BufRead, Write};

use poaf_loader::ProteinIndex;
use poaf_types::{namespace, well_known, Annotation, Term};

use crate::acquisition::DataKind;
use crate::session::Session;

/// Maximum number of results listed per query.
pub const RESULT_LIMIT: usize = 10;

/// Columns the protein view already prints under their own labels.
const STRUCTURED_COLUMNS: &[&str] = &[
    well_known::PAF_PRO_ID,
    well_known::PAF_OBJECT_TERM,
    well_known::PAF_ONTOLOGY_ID,
    well_known::PAF_ONTOLOGY_TERM,
    well_known::PAF_RELATION,
    well_known::PAF_EVIDENCE_CODE,
    well_known::PAF_EVIDENCE_SOURCE,
];

/// One entry of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Keyword search over term names, definitions and synonyms.
    SearchTerms,
    /// Keyword search over annotation text.
    SearchAnnotations,
    /// Show one term by id.
    TermDetails,
    /// List the annotations of one protein.
    ProteinAnnotations,
    /// Dataset statistics.
    Statistics,
    /// Reload both files from the data directory.
    Reload,
    /// Leave the menu.
    Exit,
}

impl MenuChoice {
    /// All entries in menu order.
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::SearchTerms,
        MenuChoice::SearchAnnotations,
        MenuChoice::TermDetails,
        MenuChoice::ProteinAnnotations,
        MenuChoice::Statistics,
        MenuChoice::Reload,
        MenuChoice::Exit,
    ];

    /// Parses a menu number (`"1"` to `"7"`).
    pub fn parse(input: &str) -> Option<Self> {
        let number: usize = input.trim().parse().ok()?;
        Self::ALL.get(number.checked_sub(1)?).copied()
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuChoice::SearchTerms => "Search OBO terms",
            MenuChoice::SearchAnnotations => "Search PAF annotations",
            MenuChoice::TermDetails => "Get term details by ID",
            MenuChoice::ProteinAnnotations => "Get annotations for protein",
            MenuChoice::Statistics => "Show statistics",
            MenuChoice::Reload => "Reload data files",
            MenuChoice::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// The menu loop over an input and an output stream.
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Creates a menu reading from `input` and writing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the menu and returns its output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the user picks Exit or input ends.
    pub fn run(&mut self, session: &mut Session) -> io::Result<()> {
        loop {
            writeln!(self.output, "\n=== Search Options ===")?;
            for (number, choice) in MenuChoice::ALL.iter().enumerate() {
                writeln!(self.output, "{}. {}", number + 1, choice)?;
            }

            let prompt = format!("\nEnter your choice (1-{}): ", MenuChoice::ALL.len());
            let Some(line) = self.prompt(&prompt)? else {
                writeln!(self.output, "\nGoodbye!")?;
                return Ok(());
            };

            match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Thank you for using POAF!")?;
                    return Ok(());
                }
                Some(choice) => self.dispatch(choice, session)?,
                None => writeln!(self.output, "Invalid choice. Please try again.")?,
            }
        }
    }

    fn dispatch(&mut self, choice: MenuChoice, session: &mut Session) -> io::Result<()> {
        let index = session.index();
        match choice {
            MenuChoice::SearchTerms => {
                if let Some(query) = self.required("Enter search term: ", "Search term")? {
                    render_term_search(&mut self.output, &index, &query)?;
                }
            }
            MenuChoice::SearchAnnotations => {
                if let Some(query) = self.required("Enter search term: ", "Search term")? {
                    render_annotation_search(&mut self.output, &index, &query)?;
                }
            }
            MenuChoice::TermDetails => {
                if let Some(id) = self.required("Enter term ID: ", "Term ID")? {
                    render_term_details(&mut self.output, &index, &id)?;
                }
            }
            MenuChoice::ProteinAnnotations => {
                if let Some(id) = self.required("Enter protein ID: ", "Protein ID")? {
                    render_protein_annotations(&mut self.output, &index, &id)?;
                }
            }
            MenuChoice::Statistics => render_statistics(&mut self.output, session)?,
            MenuChoice::Reload => {
                writeln!(self.output, "Reloading data files...")?;
                match session.reload() {
                    Ok(report) => writeln!(
                        self.output,
                        "Loaded {} terms and {} annotations",
                        report.ontology.terms_loaded, report.annotations.rows_accepted
                    )?,
                    Err(e) => {
                        tracing::warn!(error = %e, "Reload failed");
                        writeln!(self.output, "Reload failed, keeping current data: {:#}", e)?;
                    }
                }
            }
            MenuChoice::Exit => {}
        }
        Ok(())
    }

    /// Writes a prompt and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Menu::prompt`], but rejects empty input with a message.
    fn required(&mut self, message: &str, what: &str) -> io::Result<Option<String>> {
        match self.prompt(message)? {
            Some(value) if !value.is_empty() => Ok(Some(value)),
            Some(_) => {
                writeln!(self.output, "{} cannot be empty", what)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════

/// Lists terms matching a keyword.
pub fn render_term_search<W: Write>(
    out: &mut W,
    index: &ProteinIndex,
    query: &str,
) -> io::Result<()> {
    writeln!(out, "\nSearching OBO terms for: '{}'", query)?;
    let results = index.find_terms_by_keyword(query);
    if results.is_empty() {
        return writeln!(out, "No results found");
    }

    writeln!(out, "\nFound {} results:", results.len())?;
    for (i, term) in results.iter().take(RESULT_LIMIT).enumerate() {
        writeln!(out, "{}. ID: {}", i + 1, term.id)?;
        writeln!(out, "   Name: {}", term.name.as_deref().unwrap_or("N/A"))?;
        writeln!(out, "   Matched field: {}", matched_field(term, query))?;
    }
    write_remaining(out, results.len(), "results")
}

/// Lists annotations whose descriptive text matches a keyword.
pub fn render_annotation_search<W: Write>(
    out: &mut W,
    index: &ProteinIndex,
    query: &str,
) -> io::Result<()> {
    writeln!(out, "\nSearching PAF annotations for: '{}'", query)?;
    let results = index.find_annotations_by_keyword(query);
    if results.is_empty() {
        return writeln!(out, "No results found");
    }

    writeln!(out, "\nFound {} results:", results.len())?;
    for (i, annotation) in results.iter().take(RESULT_LIMIT).enumerate() {
        writeln!(out, "{}. Line {}: {}", i + 1, annotation.line_number, annotation.protein_id)?;
        writeln!(out, "   Term: {}", or_na(&annotation.object_term))?;
        writeln!(out, "   Ontology: {}", or_na(&annotation.ontology_term))?;
    }
    write_remaining(out, results.len(), "results")
}

/// Shows every field of one term, with edges resolved to target names.
pub fn render_term_details<W: Write>(
    out: &mut W,
    index: &ProteinIndex,
    id: &str,
) -> io::Result<()> {
    writeln!(out, "\nGetting details for term: {}", id)?;
    let Some(term) = index.get_term_by_id(id) else {
        return writeln!(out, "Term not found");
    };

    writeln!(out, "\nTerm Details:")?;
    writeln!(out, "id: {}", term.id)?;
    if let Some(prefix) = namespace(&term.id) {
        writeln!(out, "namespace: {}", prefix)?;
    }
    if let Some(name) = &term.name {
        writeln!(out, "name: {}", name)?;
    }
    if let Some(definition) = &term.definition {
        if term.definition_xrefs.is_empty() {
            writeln!(out, "def: {}", definition)?;
        } else {
            writeln!(out, "def: {} [{}]", definition, term.definition_xrefs.join(", "))?;
        }
    }
    if !term.synonyms.is_empty() {
        writeln!(out, "synonym: {}", term.synonyms.join("; "))?;
    }
    for edge in index.resolve_relationships(id).unwrap_or_default() {
        let target = edge.target.map_or("not loaded", Term::label);
        writeln!(
            out,
            "{}: {} ({})",
            index.relation_label(&edge.relationship.kind),
            edge.relationship.target,
            target
        )?;
    }
    for (tag, values) in &term.attributes {
        writeln!(out, "{}: {}", tag, values.join("; "))?;
    }
    let children = index.get_children(id);
    if !children.is_empty() {
        writeln!(out, "children: {}", children.len())?;
    }
    writeln!(out)
}

/// Lists the annotations of one protein in file order.
pub fn render_protein_annotations<W: Write>(
    out: &mut W,
    index: &ProteinIndex,
    protein_id: &str,
) -> io::Result<()> {
    writeln!(out, "\nGetting annotations for protein: {}", protein_id)?;
    if !index.has_protein(protein_id) {
        return writeln!(out, "No annotations found for this protein");
    }
    let annotations = index.get_annotations_for_protein(protein_id);

    writeln!(out, "\nFound {} annotations:", annotations.len())?;
    for (i, annotation) in annotations.iter().take(RESULT_LIMIT).enumerate() {
        write_annotation(out, i + 1, annotation, index.annotation_columns())?;
    }
    write_remaining(out, annotations.len(), "annotations")
}

/// Shows counts from the last load and the version ledger.
pub fn render_statistics<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    let index = session.index();
    let report = session.report();
    let data = session.data();

    writeln!(out, "\n=== Dataset Statistics ===")?;
    writeln!(out, "OBO terms loaded: {}", index.term_count())?;
    writeln!(out, "Relation types: {}", index.typedef_count())?;
    writeln!(out, "PAF annotations loaded: {}", index.annotation_count())?;
    writeln!(out, "Proteins annotated: {}", index.protein_count())?;
    writeln!(out, "Stanzas skipped: {}", report.ontology.stanzas_skipped)?;
    writeln!(out, "Rows degraded: {}", report.annotations.rows_degraded)?;
    writeln!(out, "Rows skipped: {}", report.annotations.rows_skipped)?;
    writeln!(out, "Row acceptance: {:.1}%", report.annotations.acceptance_rate())?;
    writeln!(out, "Dangling edges: {}", report.dangling_edges)?;
    if let Some(version) = index.header().data_version() {
        writeln!(out, "Ontology release: {}", version)?;
    }
    writeln!(out, "Data directory: {}", data.root().display())?;
    writeln!(out, "OBO file: {}", data.path(DataKind::Ontology).display())?;
    writeln!(out, "PAF file: {}", data.path(DataKind::Annotations).display())?;

    writeln!(out, "\nLast updates:")?;
    for kind in DataKind::ALL {
        match session.versions().last_updated(kind) {
            Some(at) => writeln!(out, "{}: {}", kind, at.to_rfc3339())?,
            None => writeln!(out, "{}: Unknown", kind)?,
        }
    }
    writeln!(out)
}

fn write_annotation<W: Write>(
    out: &mut W,
    number: usize,
    annotation: &Annotation,
    columns: &[String],
) -> io::Result<()> {
    let description = if annotation.object_term.is_empty() {
        "(no description)"
    } else {
        annotation.object_term.as_str()
    };
    writeln!(out, "{}. Line {}: {}", number, annotation.line_number, description)?;
    writeln!(out, "   Ontology ID: {}", or_na(&annotation.ontology_id))?;
    writeln!(out, "   Ontology Term: {}", or_na(&annotation.ontology_term))?;
    writeln!(out, "   Relation: {}", or_na(&annotation.relation))?;
    if !annotation.evidence().is_empty() {
        writeln!(out, "   Evidence: {}", annotation.evidence())?;
    }

    // Remaining non-empty cells, labelled with their column names.
    for i in 0..annotation.fields.len() {
        let value = annotation.field(i);
        if value.is_empty() {
            continue;
        }
        match columns.get(i) {
            Some(name) if is_structured(name) => {}
            Some(name) => writeln!(out, "   {}: {}", name, value)?,
            None => writeln!(out, "   Column {}: {}", i + 1, value)?,
        }
    }
    Ok(())
}

fn is_structured(column: &str) -> bool {
    STRUCTURED_COLUMNS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(column))
}

fn write_remaining<W: Write>(out: &mut W, total: usize, noun: &str) -> io::Result<()> {
    if total > RESULT_LIMIT {
        writeln!(out, "   ... and {} more {}", total - RESULT_LIMIT, noun)?;
    }
    writeln!(out)
}

/// Names the first text field of a term that contains the query.
fn matched_field(term: &Term, query: &str) -> &'static str {
    let needle = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);

    if term.name.as_deref().is_some_and(hit) {
        "name"
    } else if term.definition.as_deref().is_some_and(hit) {
        "definition"
    } else {
        "synonym"
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}
