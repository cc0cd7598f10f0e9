//! WordprocessingML change-markup reader.
//!
//! Tracked changes are not visible through a document's plain paragraph text,
//! so the revision elements (`w:ins`, `w:del`, `w:moveTo`, `w:moveFrom`) are
//! read straight from `word/document.xml`. Each paragraph becomes an ordered
//! list of [`Segment`]s, and [`RevisionMarkup::mine_triples`] pairs adjacent
//! deletions and insertions into [`MinedTriple`]s.

use clauseguard_core::{MinedTriple, RevisionEvent, RevisionKind};
use roxmltree::{Document, Node, NodeId};

/// WordprocessingML main namespace.
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Unmarked text.
    Plain(String),
    Revision(RevisionEvent),
}

/// One `w:p` element as plain and revised segments, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphMarkup {
    pub segments: Vec<Segment>,
}

impl ParagraphMarkup {
    pub fn has_revisions(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Revision(_)))
    }

    /// Unmarked text only.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Plain(t) => Some(t.as_str()),
                Segment::Revision(_) => None,
            })
            .collect()
    }

    /// Text with insertions accepted and deletions dropped.
    pub fn accepted_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Plain(t) => Some(t.as_str()),
                Segment::Revision(ev) if ev.kind == RevisionKind::Insertion => Some(ev.text.as_str()),
                Segment::Revision(_) => None,
            })
            .collect()
    }

    /// Pair adjacent deletions and insertions.
    ///
    /// Deletions accumulate into the original side and insertions into the
    /// suggested side. The pending pair closes once both sides hold text; a
    /// deletion after inserted text, non-blank plain text, or the end of the
    /// paragraph also closes it.
    fn pair_spans(&self) -> Vec<PairSpan> {
        let mut spans = Vec::new();
        let mut pending: Option<PairSpan> = None;

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Plain(text) => {
                    if !text.trim().is_empty() {
                        flush(&mut pending, &mut spans);
                    }
                }
                Segment::Revision(ev) => {
                    if pending.as_ref().is_some_and(|p| p.closes_before(ev.kind)) {
                        flush(&mut pending, &mut spans);
                    }
                    let span = pending.get_or_insert_with(|| PairSpan::at(idx));
                    match ev.kind {
                        RevisionKind::Deletion => span.original.push_str(&ev.text),
                        RevisionKind::Insertion => span.suggested.push_str(&ev.text),
                    }
                    span.last = idx;
                }
            }
        }
        flush(&mut pending, &mut spans);
        spans
    }

    /// Nearest unmarked words around a span: trailing words before it, else
    /// leading words after it.
    fn context_for(&self, span: &PairSpan, window: usize) -> Option<String> {
        let before: String = self.segments[..span.first]
            .iter()
            .filter_map(plain)
            .collect();
        let before = tail_words(&before, window);
        if !before.is_empty() {
            return Some(before);
        }
        let after: String = self.segments[span.last + 1..]
            .iter()
            .filter_map(plain)
            .collect();
        let after = head_words(&after, window);
        (!after.is_empty()).then_some(after)
    }
}

#[derive(Debug)]
struct PairSpan {
    original: String,
    suggested: String,
    first: usize,
    last: usize,
}

impl PairSpan {
    fn at(idx: usize) -> Self {
        Self {
            original: String::new(),
            suggested: String::new(),
            first: idx,
            last: idx,
        }
    }

    fn closes_before(&self, next: RevisionKind) -> bool {
        match next {
            RevisionKind::Deletion => !self.suggested.is_empty(),
            RevisionKind::Insertion => !self.original.is_empty() && !self.suggested.is_empty(),
        }
    }
}

fn flush(pending: &mut Option<PairSpan>, spans: &mut Vec<PairSpan>) {
    if let Some(span) = pending.take() {
        if !span.original.trim().is_empty() || !span.suggested.trim().is_empty() {
            spans.push(span);
        }
    }
}

fn plain(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Plain(t) => Some(t.as_str()),
        Segment::Revision(_) => None,
    }
}

fn tail_words(text: &str, n: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words[words.len().saturating_sub(n)..].join(" ")
}

fn head_words(text: &str, n: usize) -> String {
    text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
}

/// Revision markup of a whole document body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevisionMarkup {
    pub paragraphs: Vec<ParagraphMarkup>,
}

impl RevisionMarkup {
    pub fn parse(xml: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(xml)?;
        let paragraphs = doc
            .descendants()
            .filter(|n| is_w(n, "p") && !n.ancestors().skip(1).any(|a| is_w(&a, "p")))
            .map(read_paragraph)
            .collect();
        Ok(Self { paragraphs })
    }

    /// Every revision event in document order.
    pub fn events(&self) -> impl Iterator<Item = &RevisionEvent> {
        self.paragraphs.iter().flat_map(|p| {
            p.segments.iter().filter_map(|s| match s {
                Segment::Revision(ev) => Some(ev),
                Segment::Plain(_) => None,
            })
        })
    }

    /// Accept-all paragraph texts, one per `w:p`.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(|p| p.accepted_text()).collect()
    }

    /// Pair the document's revisions into triples.
    ///
    /// Context is the nearest unmarked text of the same paragraph, limited to
    /// `context_window` words. Paragraphs without any revision are remembered
    /// and the latest one serves as context when a revised paragraph has no
    /// unmarked text of its own.
    pub fn mine_triples(&self, context_window: usize) -> Vec<MinedTriple> {
        let mut triples = Vec::new();
        let mut last_clean: Option<String> = None;

        for paragraph in &self.paragraphs {
            if !paragraph.has_revisions() {
                let tail = tail_words(&paragraph.plain_text(), context_window);
                if !tail.is_empty() {
                    last_clean = Some(tail);
                }
                continue;
            }

            for span in paragraph.pair_spans() {
                let context_text = paragraph
                    .context_for(&span, context_window)
                    .or_else(|| last_clean.clone());
                triples.push(MinedTriple {
                    original_text: span.original.trim().to_string(),
                    suggested_text: span.suggested.trim().to_string(),
                    context_text,
                });
            }
        }
        triples
    }
}

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

/// Innermost revision element between `node` and its paragraph.
fn revision_container<'a, 'input>(
    node: Node<'a, 'input>,
    paragraph: Node<'a, 'input>,
) -> Option<(Node<'a, 'input>, RevisionKind)> {
    for ancestor in node.ancestors() {
        if ancestor == paragraph {
            break;
        }
        if is_w(&ancestor, "ins") || is_w(&ancestor, "moveTo") {
            return Some((ancestor, RevisionKind::Insertion));
        }
        if is_w(&ancestor, "del") || is_w(&ancestor, "moveFrom") {
            return Some((ancestor, RevisionKind::Deletion));
        }
    }
    None
}

fn read_paragraph(paragraph: Node) -> ParagraphMarkup {
    // (owning revision element, segment) so runs of one revision merge.
    let mut pieces: Vec<(Option<NodeId>, Segment)> = Vec::new();

    for node in paragraph.descendants().filter(|n| n.is_element()) {
        if node.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        let text = match node.tag_name().name() {
            "t" | "delText" => node.text().unwrap_or_default(),
            "tab" => "\t",
            "br" | "cr" => "\n",
            _ => continue,
        };

        match revision_container(node, paragraph) {
            None => match pieces.last_mut() {
                Some((None, Segment::Plain(buf))) => buf.push_str(text),
                _ => pieces.push((None, Segment::Plain(text.to_string()))),
            },
            Some((rev, kind)) => match pieces.last_mut() {
                Some((Some(id), Segment::Revision(ev))) if *id == rev.id() => ev.text.push_str(text),
                _ => pieces.push((
                    Some(rev.id()),
                    Segment::Revision(RevisionEvent::new(
                        kind,
                        text.to_string(),
                        rev.attribute((W_NS, "author")),
                        rev.attribute((W_NS, "date")),
                    )),
                )),
            },
        }
    }

    let segments = pieces
        .into_iter()
        .map(|(_, segment)| segment)
        .filter(|segment| match segment {
            Segment::Revision(ev) => !ev.text.trim().is_empty(),
            Segment::Plain(_) => true,
        })
        .collect();
    ParagraphMarkup { segments }
}
