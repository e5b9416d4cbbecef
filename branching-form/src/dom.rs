//! A small, tolerant markup tree.
//!
//! Templates are HTML fragments authored alongside the form, so the parser
//! only needs to understand well-behaved markup: elements and attributes,
//! void and self-closing elements, comments, declarations and the raw text
//! bodies of `script` and `style`. Unmatched closing tags are ignored and
//! elements left open at the end of the input are closed implicitly.
//!
//! Text is kept in its markup (escaped) form. Attribute values are decoded
//! on parse and escaped again on output, so `attr` returns the value a host
//! would read from a live document.

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose body is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A node in a markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),

    /// Character data, kept escaped.
    Text(String),

    /// The body of a `<!-- ... -->` comment.
    Comment(String),

    /// A `<!...>` or `<?...>` declaration, kept verbatim.
    Declaration(String),
}

impl Node {
    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Get the element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Self::Text(text) => out.push_str(text),
            Self::Comment(_) | Self::Declaration(_) => {}
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(el) => el.write_html(out),
            Self::Text(text) => out.push_str(text),
            Self::Comment(body) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            Self::Declaration(raw) => out.push_str(raw),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value. Valueless attributes yield `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Set an attribute to a plain (unescaped) value.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = Some(value.to_string()),
            None => self.attributes.push((name.to_string(), Some(value.to_string()))),
        }
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Check whether the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// The child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to the child nodes.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Append nodes as children.
    pub fn append(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.children.extend(nodes);
    }

    /// Get the concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.children.iter().for_each(|c| c.collect_text(&mut out));
        out
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
        out.push('>');
        if self.is_void() {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A parsed fragment: the sequence of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document from existing nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Parse markup into a document.
    pub fn parse(markup: &str) -> Self {
        Self {
            nodes: Parser::new(markup).run(),
        }
    }

    /// The top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Take the top-level nodes.
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Serialize the top-level nodes.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }

    /// Find the first element with the given id, depth first.
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        find_by_id(&self.nodes, id)
    }

    /// Find the first element with the given id, depth first.
    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        find_by_id_mut(&mut self.nodes, id)
    }

    /// Collect all elements carrying the given class, in document order.
    pub fn elements_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_by_class(&self.nodes, class, &mut found);
        found
    }

    /// Visit every element mutably, in document order.
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        walk_mut(&mut self.nodes, &mut f);
    }

    /// Get the concatenated text of all nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.nodes.iter().for_each(|n| n.collect_text(&mut out));
        out
    }
}

/// Serialize a sequence of nodes.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write_html(&mut out);
    }
    out
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Decode the character references that may appear in attribute values.
///
/// Unknown or malformed references are kept as written.
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let name = &rest[1..semi];
            let ch = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi + 1))
        });
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn find_by_id<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Element> {
    nodes.iter().find_map(|node| match node {
        Node::Element(el) if el.id() == Some(id) => Some(el),
        Node::Element(el) => find_by_id(&el.children, id),
        _ => None,
    })
}

fn find_by_id_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Element> {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.id() == Some(id) {
                return Some(el);
            }
            if let Some(found) = find_by_id_mut(&mut el.children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn collect_by_class<'a>(nodes: &'a [Node], class: &str, found: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.has_class(class) {
                found.push(el);
            }
            collect_by_class(&el.children, class, found);
        }
    }
}

fn walk_mut(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            walk_mut(&mut el.children, f);
        }
    }
}

struct StartTag {
    element: Element,
    self_closing: bool,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    open: Vec<Element>,
    roots: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
            roots: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(mut self) -> Vec<Node> {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if let Some(body) = rest.strip_prefix("<!--") {
                let (comment, consumed) = match body.find("-->") {
                    Some(end) => (&body[..end], 4 + end + 3),
                    None => (body, rest.len()),
                };
                self.push(Node::Comment(comment.to_string()));
                self.pos += consumed;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let end = rest.find('>').map_or(rest.len(), |i| i + 1);
                self.push(Node::Declaration(rest[..end].to_string()));
                self.pos += end;
            } else if let Some(body) = rest.strip_prefix("</") {
                let end = body.find('>').unwrap_or(body.len());
                let name = body[..end].trim().to_ascii_lowercase();
                self.close(&name);
                self.pos += (2 + end + 1).min(rest.len());
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
                && let Some((tag, consumed)) = parse_start_tag(rest)
            {
                self.pos += consumed;
                self.open_element(tag);
            } else {
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| *c == '<')
                    .map_or(rest.len(), |(i, _)| i);
                self.push(Node::Text(rest[..end].to_string()));
                self.pos += end;
            }
        }

        while let Some(el) = self.open.pop() {
            self.push(Node::Element(el));
        }
        self.roots
    }

    fn open_element(&mut self, tag: StartTag) {
        let StartTag {
            element,
            self_closing,
        } = tag;
        if self_closing || element.is_void() {
            self.push(Node::Element(element));
            return;
        }

        if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            let closing = format!("</{}", element.name);
            let rest = self.rest();
            let end = rest
                .to_ascii_lowercase()
                .find(&closing)
                .unwrap_or(rest.len());
            let mut element = element;
            if end > 0 {
                element.children.push(Node::Text(rest[..end].to_string()));
            }
            self.pos += end;
            self.open.push(element);
            return;
        }

        self.open.push(element);
    }

    fn close(&mut self, name: &str) {
        if !self.open.iter().any(|el| el.name == name) {
            return;
        }
        while let Some(el) = self.open.pop() {
            let matched = el.name == name;
            self.push(Node::Element(el));
            if matched {
                break;
            }
        }
    }

    fn push(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }
}

/// Parse `<name attr=value ...>` at the start of `input`.
///
/// Returns `None` when the tag is not terminated, in which case the caller
/// treats the `<` as text.
fn parse_start_tag(input: &str) -> Option<(StartTag, usize)> {
    let is_name_end = |c: char| c.is_whitespace() || c == '/' || c == '>';
    let mut pos = 1;
    let name_len = input[pos..].find(is_name_end)?;
    let mut element = Element::new(&input[pos..pos + name_len]);
    pos += name_len;

    loop {
        pos += input[pos..].len() - input[pos..].trim_start().len();
        let rest = &input[pos..];
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with('>') {
            return Some((
                StartTag {
                    element,
                    self_closing: false,
                },
                pos + 1,
            ));
        }
        if rest.starts_with("/>") {
            return Some((
                StartTag {
                    element,
                    self_closing: true,
                },
                pos + 2,
            ));
        }
        if rest.starts_with('/') {
            pos += 1;
            continue;
        }

        let attr_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let attr_name = rest[..attr_len].to_ascii_lowercase();
        pos += attr_len;

        let after_name = &input[pos..];
        let trimmed = after_name.trim_start();
        let Some(value_part) = trimmed.strip_prefix('=') else {
            element.attributes.push((attr_name, None));
            continue;
        };
        pos += after_name.len() - trimmed.len() + 1;
        pos += value_part.len() - value_part.trim_start().len();

        let rest = &input[pos..];
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let close = rest[1..].find(quote)?;
                pos += close + 2;
                decode_entities(&rest[1..close + 1])
            }
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                pos += len;
                decode_entities(&rest[..len])
            }
        };
        element.attributes.push((attr_name, Some(value)));
    }
}
