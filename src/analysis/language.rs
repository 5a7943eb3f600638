//! Per-language regex tables used by the analyzers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Rust,
    Go,
    /// Anything else gets generic heuristics.
    Other,
}

impl Language {
    /// Never fails: unknown names map to [`Language::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "python" | "py" | "python3" => Language::Python,
            "javascript" | "js" | "typescript" | "ts" | "node" | "jsx" | "tsx" => {
                Language::JavaScript
            }
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            _ => Language::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Other => "generic",
        }
    }

    pub fn patterns(&self) -> &'static Patterns {
        match self {
            Language::Python => &PYTHON,
            Language::JavaScript => &JAVASCRIPT,
            Language::Rust => &RUST,
            Language::Go => &GO,
            Language::Other => &GENERIC,
        }
    }

    pub fn comment_prefixes(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["#"],
            Language::JavaScript | Language::Rust | Language::Go => &["//", "/*", "*"],
            Language::Other => &["#", "//", "/*", "*", "--"],
        }
    }

    pub fn is_comment(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.comment_prefixes().iter().any(|p| trimmed.starts_with(p))
    }

    /// Whether an imported module belongs to the language's standard library.
    pub fn is_stdlib(&self, module: &str) -> bool {
        let base = module
            .split(['.', '/', ':'])
            .next()
            .unwrap_or(module)
            .trim_start_matches("node:");
        match self {
            Language::Python => PYTHON_STDLIB.contains(&base),
            Language::JavaScript => module.starts_with("node:") || NODE_BUILTINS.contains(&base),
            Language::Rust => ["std", "core", "alloc", "crate", "self", "super"].contains(&base),
            // Go standard packages have no domain in their first path element.
            Language::Go => !module.split('/').next().unwrap_or(module).contains('.'),
            Language::Other => false,
        }
    }
}

impl Serialize for Language {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PYTHON_STDLIB: &[&str] = &[
    "os", "sys", "json", "time", "datetime", "collections", "itertools", "functools", "operator",
    "math", "random", "re", "string", "io", "pathlib", "typing", "logging", "asyncio",
    "subprocess", "shutil", "hashlib", "dataclasses", "enum", "abc", "unittest", "argparse",
    "csv", "sqlite3", "threading", "urllib", "http", "socket", "tempfile", "copy", "pickle",
];

const NODE_BUILTINS: &[&str] = &[
    "fs", "path", "http", "https", "os", "crypto", "util", "events", "stream", "url",
    "child_process", "net", "zlib", "buffer", "assert",
];

/// Compiled regexes for one language. Patterns that fail to compile are
/// left out rather than aborting analysis.
#[derive(Debug)]
pub struct Patterns {
    pub functions: Option<Regex>,
    pub classes: Option<Regex>,
    pub imports: Option<Regex>,
    /// Each captures the imported module name in group 1.
    pub import_names: Vec<Regex>,
    /// Keywords counted for the complexity bucket.
    pub branches: Option<Regex>,
    /// Decision points added to a base of 1 for cyclomatic complexity.
    pub decisions: Option<Regex>,
    /// Named function definitions; group 1 is the name, group 2 the parameters.
    pub signatures: Option<Regex>,
    pub security: Vec<(Regex, &'static str)>,
}

impl Patterns {
    fn new(table: &Table) -> Self {
        let compile = |p: &str| Regex::new(p).ok();
        Self {
            functions: compile(table.functions),
            classes: compile(table.classes),
            imports: compile(table.imports),
            import_names: table.import_names.iter().filter_map(|p| compile(p)).collect(),
            branches: compile(table.branches),
            decisions: compile(table.decisions),
            signatures: compile(table.signatures),
            security: table
                .security
                .iter()
                .filter_map(|(p, d)| compile(p).map(|re| (re, *d)))
                .collect(),
        }
    }
}

pub fn count(re: &Option<Regex>, text: &str) -> usize {
    re.as_ref().map_or(0, |re| re.find_iter(text).count())
}

struct Table {
    functions: &'static str,
    classes: &'static str,
    imports: &'static str,
    import_names: &'static [&'static str],
    branches: &'static str,
    decisions: &'static str,
    signatures: &'static str,
    security: &'static [(&'static str, &'static str)],
}

static PYTHON: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::new(&Table {
        functions: r"(?m)^\s*(?:async\s+)?def\s+\w+",
        classes: r"(?m)^\s*class\s+\w+",
        imports: r"(?m)^\s*(?:import|from)\s+[\w\.]+",
        import_names: &[
            r"(?m)^\s*import\s+([a-zA-Z_][\w\.]*)",
            r"(?m)^\s*from\s+([a-zA-Z_][\w\.]*)\s+import",
        ],
        branches: r"\b(?:if|elif|else|for|while|try|except)\b",
        decisions: r"\b(?:if|elif|for|while|try|with|and|or)\b",
        signatures: r"(?m)^\s*(?:async\s+)?def\s+(\w+)\s*\(([^)]*)\)",
        security: &[
            (r"(?i)\beval\s*\(", "Dangerous eval() usage"),
            (r"(?i)\bexec\s*\(", "Dangerous exec() usage"),
            (r"__import__\s*\(", "Dynamic import usage"),
            (r#"open\s*\([^)]*["']w["']"#, "File write operation"),
            (r"subprocess\.", "Subprocess execution"),
            (r"os\.system\s*\(", "OS system command execution"),
            (r"pickle\.loads?\s*\(", "Pickle deserialization (unsafe)"),
            (r"yaml\.load\s*\(", "YAML load without safe_load"),
            (
                r#"(?i)(?:execute|executemany)\s*\(\s*(?:f["']|["'][^"']*["']\s*%|["'][^"']*["']\s*\+)"#,
                "SQL query built from strings (injection risk)",
            ),
        ],
    })
});

static JAVASCRIPT: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::new(&Table {
        functions: r"function\s+\w+|=>\s*\{|\w+\s*:\s*function",
        classes: r"\bclass\s+\w+",
        imports: r"(?m)^\s*import\s|require\s*\(",
        import_names: &[
            r#"(?m)^\s*import\s+(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"]"#,
            r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        ],
        branches: r"\b(?:if|else|for|while|switch|case|try|catch)\b",
        decisions: r"\b(?:if|for|while|case|catch)\b|&&|\|\|",
        signatures: r"function\s+(\w+)\s*\(([^)]*)\)",
        security: &[
            (r"\beval\s*\(", "Dangerous eval() usage"),
            (r"\bFunction\s*\(", "Function constructor"),
            (r"innerHTML\s*=", "InnerHTML assignment (XSS risk)"),
            (r"document\.write\s*\(", "Document.write usage"),
            (r#"setTimeout\s*\(\s*["']"#, "setTimeout with string"),
            (r#"setInterval\s*\(\s*["']"#, "setInterval with string"),
            (r"child_process", "Child process execution"),
        ],
    })
});

static RUST: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::new(&Table {
        functions: r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+\w+",
        classes: r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait)\s+\w+",
        imports: r"(?m)^\s*(?:pub\s+)?use\s+",
        import_names: &[r"(?m)^\s*(?:pub\s+)?use\s+([a-zA-Z_]\w*)"],
        branches: r"\b(?:if|else|for|while|loop|match)\b",
        decisions: r"\b(?:if|for|while|loop)\b|=>|&&|\|\|",
        signatures: r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+(\w+)\s*(?:<[^>]*>)?\s*\(([^)]*)\)",
        security: &[
            (r"\bunsafe\s*\{", "Unsafe block"),
            (r"\btransmute\b", "Memory transmute (unsafe)"),
            (r"Command::new\s*\(", "Process execution via Command"),
            (
                r#"format!\s*\(\s*"(?i:[^"]*\b(?:select|insert|update|delete)\b)"#,
                "SQL built with format! (injection risk)",
            ),
        ],
    })
});

static GO: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::new(&Table {
        functions: r"(?m)^\s*func\s+",
        classes: r"(?m)^\s*type\s+\w+\s+(?:struct|interface)\b",
        imports: r#"(?m)^\s*import\s+(?:\w+\s+)?"|^\s*(?:\w+\s+)?"[\w./-]+"\s*$"#,
        import_names: &[r#"(?m)^\s*(?:import\s+)?(?:\w+\s+)?"([\w./-]+)"\s*$"#],
        branches: r"\b(?:if|else|for|switch|case|select)\b",
        decisions: r"\b(?:if|for|case)\b|&&|\|\|",
        signatures: r"(?m)^\s*func\s+(?:\([^)]*\)\s*)?(\w+)\s*\(([^)]*)\)",
        security: &[
            (r"exec\.Command\s*\(", "OS command execution via exec.Command"),
            (r"unsafe\.Pointer", "unsafe.Pointer usage"),
            (
                r#"(?:Query|Exec|QueryRow)\s*\(\s*(?:fmt\.Sprintf|"[^"]*"\s*\+)"#,
                "SQL query built from strings (injection risk)",
            ),
            (r"InsecureSkipVerify\s*:\s*true", "TLS certificate verification disabled"),
        ],
    })
});

static GENERIC: LazyLock<Patterns> = LazyLock::new(|| {
    Patterns::new(&Table {
        functions: r"\b(?:function|def|fn|func)\s+\w+",
        classes: r"\bclass\s+\w+",
        imports: r"(?m)^\s*(?:import|use|#include|require)\b",
        import_names: &[],
        branches: r"\b(?:if|else|for|while|switch|case|try|catch)\b",
        decisions: r"\b(?:if|for|while|case|catch)\b|&&|\|\|",
        signatures: r"\b(?:function|def|fn|func)\s+(\w+)\s*\(([^)]*)\)",
        security: &[
            (r"\beval\s*\(", "Dangerous eval() usage"),
            (r"\bexec\s*\(", "Dangerous exec() usage"),
            (r"\bsystem\s*\(", "OS system command execution"),
        ],
    })
});
