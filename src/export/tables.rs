//! CSV tables: the chunk artifact, figure metadata and the unified graph.

use std::io::{Read, Write};
use std::str::FromStr;

use csv::StringRecord;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{BBox, Chunk, ChunkId, FigureRecord, Graph, LinkTarget, Node, NodeData};

/// Columns of the chunk artifact, in output order.
pub const CHUNK_COLUMNS: [&str; 9] = [
    "chunk_id",
    "page_start",
    "page_end",
    "type",
    "font_size",
    "text",
    "bbox",
    "hyperlink_target",
    "items",
];

/// Columns of the figure table, in output order; all are required.
pub const FIGURE_COLUMNS: [&str; 10] = [
    "figure_id",
    "figure_number",
    "page",
    "caption_chunk",
    "caption_text",
    "file",
    "saved_ext",
    "bbox",
    "width_px",
    "height_px",
];

/// Header lookup for one table.
struct Columns {
    artifact: &'static str,
    headers: StringRecord,
}

impl Columns {
    fn new(artifact: &'static str, headers: StringRecord, required: &[&str]) -> Result<Self> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !headers.iter().any(|h| h.trim() == **name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns {
                artifact: artifact.to_string(),
                columns: missing,
            });
        }
        Ok(Self { artifact, headers })
    }

    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|i| record.get(i))
            .unwrap_or("")
    }

    fn parse<T: FromStr>(&self, record: &StringRecord, row: usize, name: &str) -> Result<T> {
        let raw = self.get(record, name).trim();
        raw.parse().map_err(|_| {
            Error::Schema(format!(
                "{} row {}: invalid {} '{}'",
                self.artifact, row, name, raw
            ))
        })
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Serialized form of a bounding box (`[x0,y0,x1,y1]`).
pub fn bbox_to_string(bbox: &BBox) -> String {
    let corners: [f64; 4] = (*bbox).into();
    serde_json::to_string(&corners).unwrap_or_default()
}

/// Parse a bounding box cell; blank or malformed cells yield `None`.
fn parse_bbox(raw: &str, chunk_id: &str) -> Option<BBox> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<BBox>(raw) {
        Ok(bbox) => Some(bbox),
        Err(e) => {
            log::warn!("Chunk {}: unreadable bbox '{}' ({}), dropped", chunk_id, raw, e);
            None
        }
    }
}

/// Parse an items cell; blank or malformed cells yield an empty list.
fn parse_items(raw: &str, chunk_id: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(items) => items,
        Err(e) => {
            log::warn!(
                "Chunk {}: unreadable items payload ({}), treated as empty",
                chunk_id,
                e
            );
            Vec::new()
        }
    }
}

/// Write the chunk artifact.
pub fn write_chunks<W: Write>(chunks: &[Chunk], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CHUNK_COLUMNS)?;

    for chunk in chunks {
        let bbox = chunk.bbox.as_ref().map(bbox_to_string).unwrap_or_default();
        let link = chunk
            .hyperlink_target
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_default();
        let items = serde_json::to_string(&chunk.items)?;
        wtr.write_record([
            chunk.chunk_id.to_string(),
            chunk.page_start.to_string(),
            chunk.page_end.to_string(),
            chunk.chunk_type.to_string(),
            chunk.font_size.to_string(),
            chunk.text.clone(),
            bbox,
            link,
            items,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read the chunk artifact back.
///
/// Missing columns and unparsable ids, pages, types or sizes are fatal;
/// malformed `bbox` and `items` cells are recovered with a warning.
pub fn read_chunks<R: Read>(reader: R) -> Result<Vec<Chunk>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::new("chunks.csv", rdr.headers()?.clone(), &CHUNK_COLUMNS)?;

    let mut chunks = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let id = cols.get(&record, "chunk_id").trim();
        if id.is_empty() {
            return Err(Error::Schema(format!("chunks.csv row {}: empty chunk_id", row)));
        }

        chunks.push(Chunk {
            chunk_id: ChunkId::from(id),
            page_start: cols.parse(&record, row, "page_start")?,
            page_end: cols.parse(&record, row, "page_end")?,
            chunk_type: cols.parse(&record, row, "type")?,
            font_size: cols.parse(&record, row, "font_size")?,
            text: cols.get(&record, "text").to_string(),
            bbox: parse_bbox(cols.get(&record, "bbox"), id),
            hyperlink_target: LinkTarget::parse(cols.get(&record, "hyperlink_target")),
            items: parse_items(cols.get(&record, "items"), id),
        });
    }

    log::debug!("Read {} chunks", chunks.len());
    Ok(chunks)
}

/// Parse a pixel dimension; extractors sometimes write floats.
fn parse_pixels(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u32))
}

/// Read the figure table produced by the visual-asset extractor.
pub fn read_figures<R: Read>(reader: R) -> Result<Vec<FigureRecord>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let cols = Columns::new("figures.csv", rdr.headers()?.clone(), &FIGURE_COLUMNS)?;

    let mut figures = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let figure_id = cols.get(&record, "figure_id").trim();
        if figure_id.is_empty() {
            return Err(Error::Schema(format!("figures.csv row {}: empty figure_id", row)));
        }

        figures.push(FigureRecord {
            figure_id: figure_id.to_string(),
            figure_number: non_empty(cols.get(&record, "figure_number")),
            page: cols.parse(&record, row, "page")?,
            caption_chunk: non_empty(cols.get(&record, "caption_chunk")).map(ChunkId::from),
            caption_text: cols.get(&record, "caption_text").trim().to_string(),
            file: cols.get(&record, "file").trim().to_string(),
            saved_ext: cols.get(&record, "saved_ext").trim().to_string(),
            bbox: cols.get(&record, "bbox").trim().to_string(),
            width_px: parse_pixels(cols.get(&record, "width_px")),
            height_px: parse_pixels(cols.get(&record, "height_px")),
        });
    }

    log::debug!("Read {} figures", figures.len());
    Ok(figures)
}

/// Write a figure table.
pub fn write_figures<W: Write>(figures: &[FigureRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(FIGURE_COLUMNS)?;

    let opt = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
    for f in figures {
        wtr.write_record([
            f.figure_id.clone(),
            f.figure_number.clone().unwrap_or_default(),
            f.page.to_string(),
            f.caption_chunk
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            f.caption_text.clone(),
            f.file.clone(),
            f.saved_ext.clone(),
            f.bbox.clone(),
            opt(f.width_px),
            opt(f.height_px),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Flat row of the unified node table; columns a kind lacks stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeRow {
    pub id: String,
    pub label: String,
    pub text: Option<String>,
    pub chunk_id: Option<String>,
    #[serde(rename = "type")]
    pub chunk_type: Option<String>,
    pub level: Option<u8>,
    pub order: Option<usize>,
    pub page_start: Option<u32>,
    pub page_end: Option<u32>,
    pub font_size: Option<f64>,
    pub bbox: Option<String>,
    pub hyperlink_target: Option<String>,
    pub items: Option<String>,
    pub figure_id: Option<String>,
    pub figure_number: Option<String>,
    pub page: Option<u32>,
    pub caption_chunk: Option<String>,
    pub caption_text: Option<String>,
    pub file: Option<String>,
    pub saved_ext: Option<String>,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
    pub value: Option<String>,
}

impl NodeRow {
    /// Flatten a node into the union-of-columns layout.
    pub fn from_node(node: &Node) -> Self {
        let mut row = NodeRow {
            id: node.id.clone(),
            label: node.label().to_string(),
            ..Default::default()
        };

        match &node.data {
            NodeData::Chunk(c) => {
                row.text = Some(c.text.clone());
                row.chunk_id = Some(c.chunk_id.to_string());
                row.chunk_type = Some(c.chunk_type.as_str().to_string());
                row.page_start = Some(c.page_start);
                row.page_end = Some(c.page_end);
                row.font_size = Some(c.font_size);
                row.bbox = c.bbox.as_ref().map(bbox_to_string);
                row.hyperlink_target = c.hyperlink_target.as_ref().map(|t| t.to_string());
                if !c.items.is_empty() {
                    row.items = serde_json::to_string(&c.items).ok();
                }
            }
            NodeData::Section(s) => {
                row.text = Some(s.text.clone());
                row.chunk_id = s.chunk_id.as_ref().map(|c| c.to_string());
                row.level = Some(s.level);
                row.page_start = Some(s.page_start);
                row.page_end = Some(s.page_end);
                row.font_size = Some(s.font_size);
                row.bbox = s.bbox.as_ref().map(bbox_to_string);
            }
            NodeData::ListItem(i) => {
                row.text = Some(i.text.clone());
                row.chunk_id = Some(i.chunk_id.to_string());
                row.order = Some(i.order);
                row.page_start = Some(i.page_start);
                row.page_end = Some(i.page_end);
            }
            NodeData::Figure(f) => {
                row.figure_id = Some(f.figure_id.clone());
                row.figure_number = f.figure_number.clone();
                row.page = Some(f.page);
                row.caption_chunk = f.caption_chunk.as_ref().map(|c| c.to_string());
                row.caption_text = Some(f.caption_text.clone());
                row.file = Some(f.file.clone());
                row.saved_ext = Some(f.saved_ext.clone());
                row.bbox = non_empty(&f.bbox);
                row.width_px = f.width_px;
                row.height_px = f.height_px;
            }
            NodeData::ReferenceTarget { value } | NodeData::Url { value } => {
                row.value = Some(value.clone());
            }
        }

        row
    }
}

/// Write `all_nodes.csv`.
pub fn write_nodes<W: Write>(graph: &Graph, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for node in &graph.nodes {
        wtr.serialize(NodeRow::from_node(node))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `all_edges.csv`.
pub fn write_edges<W: Write>(graph: &Graph, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["source", "target", "relation"])?;
    for edge in &graph.edges {
        wtr.write_record([
            edge.source.as_str(),
            edge.target.as_str(),
            edge.relation.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChunkType, Edge, Relation};

    #[test]
    fn test_chunk_table_layout() {
        let mut chunk = Chunk::new("ch0003", ChunkType::ListBlock, 2, 11.0, "• a\n• b");
        chunk.items = vec!["• a".to_string(), "• b".to_string()];
        chunk.bbox = Some(BBox::new(50.0, 80.0, 500.0, 91.0));

        let mut out = Vec::new();
        write_chunks(&[chunk], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("chunk_id,page_start,page_end,type,font_size,text,bbox,hyperlink_target,items")
        );
        assert!(text.contains("ch0003,2,2,list_block,11,"));
        assert!(text.contains("\"[50.0,80.0,500.0,91.0]\""));
        assert!(text.contains(r#""[""• a"",""• b""]""#));
    }

    #[test]
    fn test_missing_columns_reported() {
        let data = "chunk_id,page_start,type,text\nch0000,1,paragraph,x\n";
        let err = read_chunks(data.as_bytes()).unwrap_err();
        match err {
            Error::MissingColumns { artifact, columns } => {
                assert_eq!(artifact, "chunks.csv");
                assert_eq!(
                    columns,
                    vec!["page_end", "font_size", "bbox", "hyperlink_target", "items"]
                );
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_malformed_cells_recovered() {
        let data = "chunk_id,page_start,page_end,type,font_size,text,bbox,hyperlink_target,items\n\
                    ch0000,1,1,list_block,11,x,not a box,12,[broken\n";
        let chunks = read_chunks(data.as_bytes()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].bbox, None);
        assert!(chunks[0].items.is_empty());
        assert_eq!(chunks[0].hyperlink_target, Some(LinkTarget::Page(12)));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let data = "chunk_id,page_start,page_end,type,font_size,text,bbox,hyperlink_target,items\n\
                    ch0000,1,1,heading,11,x,,,\n";
        assert!(matches!(
            read_chunks(data.as_bytes()).unwrap_err(),
            Error::Schema(_)
        ));
    }

    #[test]
    fn test_read_figures_blank_cells() {
        let data = "figure_id,figure_number,page,caption_chunk,caption_text,file,saved_ext,\
                    bbox,width_px,height_px\n\
                    p3_1,1,3,ch0010,Рис. 1,p3_1.png,png,\"[1,2,3,4]\",640.0,480\n\
                    p4_1,,4,,,,,,,\n";
        let figures = read_figures(data.as_bytes()).unwrap();
        assert_eq!(figures.len(), 2);
        assert_eq!(figures[0].caption_chunk, Some(ChunkId::from("ch0010")));
        assert_eq!(figures[0].width_px, Some(640));
        assert_eq!(figures[0].bbox, "[1,2,3,4]");
        assert_eq!(figures[1].figure_number, None);
        assert_eq!(figures[1].caption_chunk, None);
        assert_eq!(figures[1].file, "");
    }

    #[test]
    fn test_figure_table_requires_every_column() {
        let data = "figure_id,page,caption_chunk\nf1,2,ch0001\n";
        match read_figures(data.as_bytes()).unwrap_err() {
            Error::MissingColumns { artifact, columns } => {
                assert_eq!(artifact, "figures.csv");
                assert_eq!(columns.len(), 7);
                assert!(columns.contains(&"caption_text".to_string()));
                assert!(columns.contains(&"bbox".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_node_and_edge_tables() {
        let graph = Graph {
            nodes: vec![
                Node::chunk(Chunk::new("ch0000", ChunkType::Paragraph, 1, 11.0, "Body")),
                Node {
                    id: "ref_12".to_string(),
                    data: NodeData::ReferenceTarget {
                        value: "12".to_string(),
                    },
                },
            ],
            edges: vec![Edge::new("chunk_ch0000", "ref_12", Relation::LinksTo)],
        };

        let mut nodes = Vec::new();
        write_nodes(&graph, &mut nodes).unwrap();
        let nodes = String::from_utf8(nodes).unwrap();
        assert!(nodes.starts_with("id,label,text,chunk_id,type,"));
        assert!(nodes.contains("chunk_ch0000,Chunk,Body,ch0000,paragraph,"));
        assert!(nodes
            .lines()
            .any(|l| l.starts_with("ref_12,ReferenceTarget,") && l.ends_with(",12")));

        let mut edges = Vec::new();
        write_edges(&graph, &mut edges).unwrap();
        assert_eq!(
            String::from_utf8(edges).unwrap(),
            "source,target,relation\nchunk_ch0000,ref_12,LINKS_TO\n"
        );
    }
}
