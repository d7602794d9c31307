// File: ./src/model/markdown.rs
//! Owned block-structure tree built from `pulldown-cmark` events.
//!
//! Only the node kinds the task projection consumes get their own variant;
//! every other Markdown construct is folded into `Node::Other`, which keeps
//! its children so their text still flattens.
use pulldown_cmark::{Event, Options, Parser, Tag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document(Vec<Node>),
    List {
        ordered: bool,
        items: Vec<Node>,
    },
    /// `checked` is `None` for plain items, `Some(_)` for task-list items.
    ListItem {
        checked: Option<bool>,
        children: Vec<Node>,
    },
    Paragraph(Vec<Node>),
    Text(String),
    Other(Vec<Node>),
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document(c) | Node::Paragraph(c) | Node::Other(c) => c,
            Node::List { items, .. } => items,
            Node::ListItem { children, .. } => children,
            Node::Text(_) => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List { .. })
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, Node::Paragraph(_))
    }

    /// Plain text of this node: every leaf text run, in document order.
    /// Code spans, image alt text and hard breaks are not text runs.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            other => {
                for child in other.children() {
                    child.flatten_into(out);
                }
            }
        }
    }
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts
}

#[derive(Debug)]
enum FrameKind {
    Document,
    List { ordered: bool },
    Item { checked: Option<bool> },
    Paragraph,
    /// Paragraph synthesized around the inline content of a tight list item.
    ImplicitParagraph,
    /// Alt text inside is dropped.
    Image,
    Other,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> Node {
        match self.kind {
            FrameKind::Document => Node::Document(self.children),
            FrameKind::List { ordered } => Node::List {
                ordered,
                items: self.children,
            },
            FrameKind::Item { checked } => Node::ListItem {
                checked,
                children: self.children,
            },
            FrameKind::Paragraph | FrameKind::ImplicitParagraph => Node::Paragraph(self.children),
            FrameKind::Image | FrameKind::Other => Node::Other(self.children),
        }
    }
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::new(FrameKind::Document)],
        }
    }

    fn top_kind(&self) -> Option<&FrameKind> {
        self.stack.last().map(|f| &f.kind)
    }

    /// Pops the top frame and attaches it to its parent. The document frame
    /// is never popped here.
    fn close_top(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let node = frame.into_node();
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(node);
            }
        }
    }

    fn close_implicit_paragraph(&mut self) {
        if matches!(self.top_kind(), Some(FrameKind::ImplicitParagraph)) {
            self.close_top();
        }
    }

    fn ensure_inline_context(&mut self) {
        if matches!(self.top_kind(), Some(FrameKind::Item { .. })) {
            self.stack.push(Frame::new(FrameKind::ImplicitParagraph));
        }
    }

    fn in_image(&self) -> bool {
        self.stack.iter().any(|f| matches!(f.kind, FrameKind::Image))
    }

    fn push_text(&mut self, text: &str) {
        if self.in_image() {
            return;
        }
        self.ensure_inline_context();
        if let Some(frame) = self.stack.last_mut() {
            // Merge adjacent runs; pulldown-cmark splits text around brackets.
            if let Some(Node::Text(prev)) = frame.children.last_mut() {
                prev.push_str(text);
            } else {
                frame.children.push(Node::Text(text.to_string()));
            }
        }
    }

    fn start(&mut self, tag: Tag) {
        if is_inline_tag(&tag) {
            self.ensure_inline_context();
        } else {
            self.close_implicit_paragraph();
        }
        let kind = match tag {
            Tag::List(start) => FrameKind::List {
                ordered: start.is_some(),
            },
            Tag::Item => FrameKind::Item { checked: None },
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Image { .. } => FrameKind::Image,
            _ => FrameKind::Other,
        };
        self.stack.push(Frame::new(kind));
    }

    fn end(&mut self) {
        self.close_implicit_paragraph();
        self.close_top();
    }

    fn mark_task(&mut self, is_checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let FrameKind::Item { checked } = &mut frame.kind {
                *checked = Some(is_checked);
                return;
            }
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close_top();
        }
        self.stack
            .pop()
            .map(Frame::into_node)
            .unwrap_or(Node::Document(Vec::new()))
    }
}

/// Parses Markdown into a block tree. Never fails: malformed input degrades
/// the way CommonMark specifies.
pub fn parse_blocks(input: &str) -> Node {
    let mut builder = TreeBuilder::new();

    for event in Parser::new_ext(input, options()) {
        match event {
            Event::Start(tag) => builder.start(tag),
            Event::End(_) => builder.end(),
            Event::Text(text) => builder.push_text(&text),
            Event::SoftBreak => builder.push_text("\n"),
            Event::TaskListMarker(checked) => builder.mark_task(checked),
            _ => {}
        }
    }

    builder.finish()
}
