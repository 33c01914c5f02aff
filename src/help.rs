//! Boxed, fixed-width help text for a set of registered parameters.

use crate::param::{Param, ParamHandle};
use crate::registry::Registry;
use crate::value::ValueKind;

/// Default total width of the help box, borders included.
pub const DEFAULT_WIDTH: usize = 100;
/// Narrower widths are raised to this.
pub const MIN_WIDTH: usize = 40;
/// Below this many columns the description moves under the flag columns.
const MIN_DESCRIPTION_WIDTH: usize = 16;
/// Indent for descriptions placed under the flag columns.
const FALLBACK_INDENT: usize = 4;

const MANDATORY_MARKER: &str = "(*)";
const OPTIONAL_MARKER: &str = "( )";

/// Layout settings for rendered help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpConfig {
    /// Total width in columns, including the border.
    pub width: usize,
    /// Program name shown in the usage line.
    pub program: Option<String>,
    /// Free text shown under the usage line.
    pub description: Option<String>,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            program: None,
            description: None,
        }
    }
}

impl HelpConfig {
    fn inner_width(&self) -> usize {
        self.width.max(MIN_WIDTH) - 4
    }
}

/// Wrap `text` into lines of at most `width` characters.
///
/// Breaks at the last space before the limit; a word longer than `width` is
/// cut into `width`-sized chunks. Each `\n` is a forced break.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut rest: Vec<char> = paragraph.trim_end().chars().collect();
        while rest.len() > width {
            // rest[width] is the first character past the limit, so a space
            // there still yields a full-width line.
            let split = (1..=width)
                .rev()
                .find(|&i| rest[i] == ' ' && rest[i - 1] != ' ');
            let (line, tail) = match split {
                Some(i) => (&rest[..i], &rest[i..]),
                None => (&rest[..width], &rest[width..]),
            };
            lines.push(line.iter().collect::<String>().trim_end().to_string());
            let skip = tail.iter().take_while(|c| **c == ' ').count();
            rest = tail[skip..].to_vec();
        }
        lines.push(rest.into_iter().collect());
    }

    lines
}

struct HelpBox {
    inner: usize,
    out: String,
}

impl HelpBox {
    fn new(inner: usize) -> Self {
        let mut help = Self {
            inner,
            out: String::new(),
        };
        help.rule();
        help
    }

    fn rule(&mut self) {
        self.out.push('+');
        self.out.push_str(&"-".repeat(self.inner + 2));
        self.out.push_str("+\n");
    }

    fn line(&mut self, content: &str) {
        let pad = self.inner.saturating_sub(content.chars().count());
        self.out.push_str("| ");
        self.out.push_str(content);
        self.out.push_str(&" ".repeat(pad));
        self.out.push_str(" |\n");
    }

    fn text(&mut self, text: &str) {
        for line in wrap(text, self.inner) {
            self.line(&line);
        }
    }

    fn finish(mut self) -> String {
        self.rule();
        self.out
    }
}

fn header(help: &mut HelpBox, config: &HelpConfig) {
    match config.program {
        Some(ref program) => help.text(&format!("Usage: {} [flags ...]", program)),
        None => help.text("Usage: [flags ...]"),
    }
    if let Some(ref description) = config.description {
        help.line("");
        help.text(description);
    }
    help.rule();
}

fn legend(help: &mut HelpBox) {
    let types: Vec<String> = ValueKind::ALL
        .iter()
        .map(|k| format!("[{}] {}", k.tag(), k))
        .collect();
    help.text(&format!("Types: {}", types.join("  ")));
    help.text(&format!(
        "[X..] list of X  {} mandatory  {} optional",
        MANDATORY_MARKER, OPTIONAL_MARKER
    ));
    help.rule();
}

fn param_block(help: &mut HelpBox, registry: &Registry, param: &Param) {
    let mut prefix = format!("{:<width$}", param.full_flag(), width = registry.longest_flag());
    if registry.longest_short() > 0 {
        prefix.push_str(&format!(
            "  {:<width$}",
            param.short_flag().unwrap_or(""),
            width = registry.longest_short()
        ));
    }
    let marker = if param.is_mandatory() {
        MANDATORY_MARKER
    } else {
        OPTIONAL_MARKER
    };
    prefix.push_str(&format!("  {:<5} {} ", param.value_type().tag(), marker));

    let mut body = Vec::new();
    if let Some(description) = param.description() {
        body.push(description.to_string());
    }
    if let Some(default) = param.default() {
        body.push(format!("default: {}", default.join(" ")));
    }

    let prefix_width = prefix.chars().count();
    let budget = help.inner.saturating_sub(prefix_width);
    if budget < MIN_DESCRIPTION_WIDTH {
        help.text(prefix.trim_end());
        let indent = " ".repeat(FALLBACK_INDENT);
        for text in &body {
            for line in wrap(text, help.inner - FALLBACK_INDENT) {
                help.line(&format!("{}{}", indent, line));
            }
        }
        return;
    }

    let mut lines = body.iter().flat_map(|text| wrap(text, budget));
    match lines.next() {
        Some(first) => help.line(&format!("{}{}", prefix, first)),
        None => help.line(prefix.trim_end()),
    }
    let indent = " ".repeat(prefix_width);
    for line in lines {
        help.line(&format!("{}{}", indent, line));
    }
}

/// Render help for every registered parameter.
pub fn render_help(registry: &Registry, config: &HelpConfig) -> String {
    let mut help = HelpBox::new(config.inner_width());
    header(&mut help, config);
    legend(&mut help);
    if registry.is_empty() {
        help.line("(no parameters)");
    }
    for (i, param) in registry.params().iter().enumerate() {
        if i > 0 {
            help.line("");
        }
        param_block(&mut help, registry, param);
    }
    help.finish()
}

/// Render help for a single parameter.
pub fn render_param_help(registry: &Registry, handle: ParamHandle, config: &HelpConfig) -> String {
    let mut help = HelpBox::new(config.inner_width());
    header(&mut help, config);
    legend(&mut help);
    param_block(&mut help, registry, registry.get(handle));
    help.finish()
}
