//! End-to-end tests for chunking, outline building and graph assembly.

use std::collections::HashSet;

use docgraph::chunker::{ChunkClassifier, SpanGrouper};
use docgraph::export::{self, JsonFormat};
use docgraph::{
    BBox, Chunk, ChunkId, ChunkType, ChunkerConfig, Error, FigureRecord, Graph,
    HierarchyConfig, LinkTarget, NodeKind, OrphanPolicy, Pipeline, PipelineOptions, Relation,
    Span,
};

/// Lays out spans top to bottom, one line per call, breaking pages at the bottom margin.
struct Layout {
    spans: Vec<Span>,
    page: u32,
    y: f64,
}

impl Layout {
    const TOP: f64 = 60.0;
    const BOTTOM: f64 = 760.0;
    // larger than either gap threshold, so every line starts a new group
    const LEADING: f64 = 14.0;

    fn new() -> Self {
        Self {
            spans: Vec::new(),
            page: 1,
            y: Self::TOP,
        }
    }

    fn span(&self, text: &str, size: f64) -> Span {
        Span::new(
            self.page,
            text,
            BBox::new(50.0, self.y, 500.0, self.y + size),
            "Times",
            size,
        )
    }

    fn advance(&mut self, size: f64) {
        self.y += size + Self::LEADING;
        if self.y > Self::BOTTOM {
            self.next_page();
        }
    }

    fn next_page(&mut self) {
        self.page += 1;
        self.y = Self::TOP;
    }

    fn push(&mut self, span: Span) -> &mut Self {
        let size = span.size;
        self.spans.push(span);
        self.advance(size);
        self
    }

    fn text(&mut self, text: &str, size: f64) -> &mut Self {
        let span = self.span(text, size);
        self.push(span)
    }

    fn bold(&mut self, text: &str, size: f64) -> &mut Self {
        let span = self.span(text, size).bold();
        self.push(span)
    }

    fn linked(&mut self, text: &str, size: f64, target: LinkTarget) -> &mut Self {
        let span = self.span(text, size).with_link(target);
        self.push(span)
    }

    /// A bullet glyph followed by its text on the same line.
    fn bullet(&mut self, text: &str) -> &mut Self {
        let glyph = self.span("•", 11.0);
        let mut body = self.span(text, 11.0);
        body.bbox.x0 = 62.0;
        self.spans.push(glyph);
        self.push(body)
    }

    fn build(&self) -> Vec<Span> {
        self.spans.clone()
    }
}

fn long_text() -> String {
    "The controller must be mounted on a vertical surface with at least ten centimetres \
     of free space on every side to allow for cooling airflow."
        .to_string()
}

/// A two-page manual exercising every chunk type the classifier emits.
fn manual() -> Vec<Span> {
    let mut doc = Layout::new();
    doc.text("Device Manual", 18.0)
        .text("Covers models A and B.", 11.0)
        .bold("Safety", 16.0)
        .text(&long_text(), 11.0)
        .text("Installation", 14.0)
        .bullet("Unpack the device")
        .bullet("Check the contents")
        .text("1. Connect the power cable", 11.0)
        .text("2. Switch the device on", 11.0)
        .linked("See fig. 2 for the wiring", 11.0, LinkTarget::Page(12))
        .linked(&long_text(), 11.0, LinkTarget::Uri("https://example.com/manual".into()));
    doc.next_page();
    doc.text("Maintenance", 18.0)
        .text("Рис. 2 Wiring diagram", 10.0)
        .linked("Details are on page 12 of the annex.", 11.0, LinkTarget::Page(12));
    doc.build()
}

fn find<'a>(chunks: &'a [Chunk], text: &str) -> &'a Chunk {
    chunks
        .iter()
        .find(|c| c.text.starts_with(text))
        .unwrap_or_else(|| panic!("no chunk starting with {:?}", text))
}

/// Sections holding `chunk` through a `HAS_CHUNK` edge.
fn owners<'g>(graph: &'g Graph, chunk: &str) -> Vec<&'g str> {
    graph
        .edges_of(Relation::HasChunk)
        .filter(|e| e.target == chunk)
        .map(|e| e.source.as_str())
        .collect()
}

fn classify(spans: Vec<Span>) -> Vec<Chunk> {
    let config = ChunkerConfig::default();
    let groups = SpanGrouper::new(&config).group(spans);
    ChunkClassifier::new(&config)
        .unwrap()
        .classify_groups(groups)
}

// ==================== Documented Examples ====================

#[test]
fn test_numbered_line_is_ordered_list_item() {
    let mut doc = Layout::new();
    doc.text("1. Do X", 11.0);

    let classified = classify(doc.build());
    assert_eq!(classified[0].chunk_type, ChunkType::OrderedListItem);

    // a run of one still becomes a block
    let chunks = Pipeline::default().build_chunks(doc.build()).unwrap();
    assert_eq!(chunks[0].chunk_type, ChunkType::OrderedListBlock);
    assert_eq!(chunks[0].items, vec!["1. Do X"]);
}

#[test]
fn test_bullet_line_and_figure_reference() {
    let mut doc = Layout::new();
    doc.text("• Do Y", 11.0).text("Рис. 3 — diagram", 11.0);

    let classified = classify(doc.build());
    let types: Vec<ChunkType> = classified.iter().map(|c| c.chunk_type).collect();
    assert_eq!(types, vec![ChunkType::ListItem, ChunkType::Reference]);
}

#[test]
fn test_wrapped_heading_merges_across_pages() {
    let first = Span::new(1, "Installing the", BBox::new(50.0, 740.0, 400.0, 756.0), "Arial", 16.0)
        .bold();
    // same heading style, but the color shift breaks the group
    let second = Span::new(2, "control unit", BBox::new(50.0, 60.0, 400.0, 76.0), "Arial", 16.0)
        .bold()
        .with_color(0x00_33_66);

    assert_eq!(classify(vec![first.clone(), second.clone()]).len(), 2);

    let chunks = Pipeline::default().build_chunks(vec![first, second]).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_type, ChunkType::SectionH1);
    assert_eq!(chunks[0].text, "Installing the control unit");
    assert_eq!((chunks[0].page_start, chunks[0].page_end), (1, 2));
}

#[test]
fn test_outline_nesting_and_containment() {
    let mut doc = Layout::new();
    doc.text("Overview", 16.0)
        .text(&long_text(), 11.0)
        .text("Scope", 14.0)
        .text(&long_text(), 11.0)
        .text("Operation", 16.0)
        .text(&long_text(), 11.0);

    let pipeline = Pipeline::default();
    let chunks = pipeline.build_chunks(doc.build()).unwrap();
    assert_eq!(chunks.len(), 6);
    let output = pipeline.build_graph(chunks, &[]).unwrap();

    let levels: Vec<(String, u8, Option<usize>)> = output
        .sections
        .iter()
        .map(|s| (s.id.clone(), s.level, s.parent))
        .collect();
    assert_eq!(
        levels,
        vec![
            ("section_ch0000".to_string(), 1, None),
            ("section_ch0002".to_string(), 2, Some(0)),
            ("section_ch0004".to_string(), 1, None),
        ]
    );

    let graph = &output.graph;
    let subsections: Vec<(&str, &str)> = graph
        .edges_of(Relation::HasSubsection)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(subsections, vec![("section_ch0000", "section_ch0002")]);

    assert_eq!(owners(graph, "chunk_ch0001"), vec!["section_ch0000"]);
    assert_eq!(owners(graph, "chunk_ch0003"), vec!["section_ch0002"]);
    assert_eq!(owners(graph, "chunk_ch0005"), vec!["section_ch0004"]);
    assert_eq!(owners(graph, "chunk_ch0004"), vec!["section_ch0004"]);
}

#[test]
fn test_shared_reference_target_is_one_node() {
    let mut first = Chunk::new("ch0001", ChunkType::Paragraph, 1, 11.0, "see note");
    first.hyperlink_target = Some(LinkTarget::Page(12));
    let mut second = Chunk::new("ch0002", ChunkType::Paragraph, 2, 11.0, "as in note");
    second.hyperlink_target = Some(LinkTarget::Uri("12".to_string()));
    let chunks = vec![
        Chunk::new("ch0000", ChunkType::Paragraph, 1, 16.0, "Notes"),
        first,
        second,
    ];

    let output = Pipeline::default().build_graph(chunks, &[]).unwrap();
    let graph = &output.graph;

    let refs: Vec<&str> = graph
        .nodes_of(NodeKind::ReferenceTarget)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(refs, vec!["ref_12"]);
    let links: Vec<&str> = graph
        .edges_of(Relation::LinksTo)
        .map(|e| e.source.as_str())
        .collect();
    assert_eq!(links, vec!["chunk_ch0001", "chunk_ch0002"]);
    assert!(graph.edges_of(Relation::LinksTo).all(|e| e.target == "ref_12"));
}

// ==================== Full Document ====================

#[test]
fn test_manual_chunk_types() {
    let chunks = Pipeline::default().build_chunks(manual()).unwrap();

    assert_eq!(find(&chunks, "Device Manual").chunk_type, ChunkType::Paragraph);
    assert_eq!(find(&chunks, "Covers models").chunk_type, ChunkType::Caption);
    assert_eq!(find(&chunks, "Safety").chunk_type, ChunkType::SectionH1);
    assert_eq!(find(&chunks, "The controller").chunk_type, ChunkType::Paragraph);
    assert_eq!(find(&chunks, "See fig. 2").chunk_type, ChunkType::Reference);
    assert_eq!(find(&chunks, "Рис. 2").chunk_type, ChunkType::Reference);

    let bullets = find(&chunks, "• Unpack");
    assert_eq!(bullets.chunk_type, ChunkType::ListBlock);
    assert_eq!(bullets.items, vec!["• Unpack the device", "• Check the contents"]);

    let steps = find(&chunks, "1. Connect");
    assert_eq!(steps.chunk_type, ChunkType::OrderedListBlock);
    assert_eq!(steps.items.len(), 2);

    // ids stay strictly increasing after coalescing
    let ids: Vec<&ChunkId> = chunks.iter().map(|c| &c.chunk_id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_manual_graph() {
    let pipeline = Pipeline::default();
    let chunks = pipeline.build_chunks(manual()).unwrap();
    let caption = find(&chunks, "Рис. 2").chunk_id.clone();
    let figures = vec![FigureRecord {
        figure_id: "p2_1".to_string(),
        figure_number: Some("2".to_string()),
        page: 2,
        caption_chunk: Some(caption.clone()),
        caption_text: "Рис. 2 Wiring diagram".to_string(),
        file: "p2_1.png".to_string(),
        saved_ext: "png".to_string(),
        bbox: "[50, 100, 500, 400]".to_string(),
        width_px: Some(900),
        height_px: Some(600),
    }];

    let output = pipeline.build_graph(chunks, &figures).unwrap();
    let graph = &output.graph;

    // 18pt and 14pt unbolded lines define the two levels
    let titles: Vec<(&str, u8)> = output
        .sections
        .iter()
        .map(|s| (s.text.as_str(), s.level))
        .collect();
    assert_eq!(
        titles,
        vec![("Device Manual", 1), ("Installation", 2), ("Maintenance", 1)]
    );

    assert_eq!(output.stats.list_item_count, 4);
    assert_eq!(output.stats.figure_count, 1);
    assert_eq!(output.stats.reference_count, 1);
    assert_eq!(output.stats.url_count, 1);
    assert_eq!(graph.edges_of(Relation::LinksTo).count(), 3);

    let caption_node = format!("chunk_{}", caption);
    let captions: Vec<(&str, &str)> = graph
        .edges_of(Relation::Captions)
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(captions, vec![(caption_node.as_str(), "figure_p2_1")]);

    let item = graph.node("listitem_ch0005_1").map(|n| n.text());
    assert_eq!(item, Some("Check the contents"));
}

#[test]
fn test_orphans_attach_to_document_root() {
    let mut doc = Layout::new();
    doc.text("Front matter line", 11.0)
        .text("Introduction", 16.0)
        .text(&long_text(), 11.0);

    let options = PipelineOptions::new()
        .with_hierarchy(HierarchyConfig::new().with_orphan_policy(OrphanPolicy::DocumentRoot));
    let pipeline = Pipeline::new(options);
    let output = pipeline.run(&doc.build(), &docgraph::NoFigures).unwrap();

    assert_eq!(output.sections[0].id, "section_root");
    assert_eq!(output.sections[0].level, 0);
    assert!(output
        .graph
        .edges
        .iter()
        .any(|e| e.source == "section_root" && e.target == "chunk_ch0000"));

    let default_run = Pipeline::default().run(&doc.build(), &docgraph::NoFigures).unwrap();
    assert!(default_run
        .graph
        .edges
        .iter()
        .all(|e| e.target != "chunk_ch0000"));
}

#[test]
fn test_no_heading_sizes_fails_only_the_outline() {
    let mut doc = Layout::new();
    doc.text(&long_text(), 11.0).text("Short note", 11.0);

    let pipeline = Pipeline::default();
    let chunks = pipeline.build_chunks(doc.build()).unwrap();
    assert_eq!(chunks.len(), 2);

    let err = pipeline.build_graph(chunks, &[]).unwrap_err();
    assert!(matches!(err.root(), Error::NoSectionLevels { .. }));
    // the chunk sequence is handed back intact
    assert_eq!(err.chunks().map(|c| c.len()), Some(2));
}

#[test]
fn test_caption_for_unknown_chunk_is_rejected() {
    let chunks = vec![Chunk::new("ch0000", ChunkType::Paragraph, 1, 16.0, "Title")];
    let figures = vec![FigureRecord {
        figure_id: "7".to_string(),
        figure_number: None,
        page: 1,
        caption_chunk: Some(ChunkId::from("ch0099")),
        caption_text: String::new(),
        file: String::new(),
        saved_ext: String::new(),
        bbox: String::new(),
        width_px: None,
        height_px: None,
    }];

    let err = Pipeline::default().build_graph(chunks, &figures).unwrap_err();
    assert!(matches!(err.root(), Error::DanglingEdge { .. }));
}

// ==================== Properties ====================

#[test]
fn test_runs_are_deterministic() {
    let render = || {
        let pipeline = Pipeline::default();
        let chunks = pipeline.build_chunks(manual()).unwrap();
        let mut csv = Vec::new();
        export::write_chunks(&chunks, &mut csv).unwrap();
        let output = pipeline.build_graph(chunks, &[]).unwrap();
        let json = export::to_json(&output.graph, JsonFormat::Compact).unwrap();
        (csv, json)
    };
    assert_eq!(render(), render());
}

#[test]
fn test_page_ranges_are_ordered() {
    let chunks = Pipeline::default().build_chunks(manual()).unwrap();
    assert!(chunks.iter().all(|c| c.page_start <= c.page_end));
    assert_eq!(chunks.last().map(|c| c.page_end), Some(2));
}

#[test]
fn test_section_forest_is_valid() {
    let pipeline = Pipeline::default();
    let chunks = pipeline.build_chunks(manual()).unwrap();
    let hierarchy = pipeline.build_hierarchy(&chunks).unwrap();

    for (index, section) in hierarchy.arena.iter().enumerate() {
        if let Some(parent) = hierarchy.arena.parent(index) {
            assert!(parent.level < section.level);
        }
        let ancestors = hierarchy.arena.ancestors(index);
        assert!(ancestors.iter().all(|&a| a < index));
    }
}

#[test]
fn test_list_blocks_round_trip() {
    let chunks = Pipeline::default().build_chunks(manual()).unwrap();
    let blocks: Vec<&Chunk> = chunks
        .iter()
        .filter(|c| c.chunk_type.is_list_block())
        .collect();
    assert_eq!(blocks.len(), 2);
    for block in blocks {
        assert_eq!(block.items.join("\n"), block.text);
        assert_eq!(block.hyperlink_target, None);
    }
}

#[test]
fn test_graph_integrity() {
    let pipeline = Pipeline::default();
    let chunks = pipeline.build_chunks(manual()).unwrap();
    let output = pipeline.build_graph(chunks, &[]).unwrap();
    let graph = &output.graph;

    let mut ids = HashSet::new();
    for node in &graph.nodes {
        assert!(ids.insert(node.id.as_str()), "duplicate id {}", node.id);
    }
    for edge in &graph.edges {
        assert!(ids.contains(edge.source.as_str()), "dangling {:?}", edge);
        assert!(ids.contains(edge.target.as_str()), "dangling {:?}", edge);
    }
}
