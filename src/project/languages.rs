//! Per-language project conventions: source extensions, manifest and config
//! file names, test naming and framework indicators.

/// Conventions for one language. Framework indicators are matched against
/// manifest contents and project-relative paths.
#[derive(Debug)]
pub struct Profile {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub dependency_files: &'static [&'static str],
    pub config_files: &'static [&'static str],
    /// `*` globs match file names, a trailing `/` matches a directory on the
    /// path.
    pub test_patterns: &'static [&'static str],
    pub frameworks: &'static [(&'static str, &'static [&'static str])],
}

pub static PROFILES: &[Profile] = &[
    Profile {
        name: "python",
        extensions: &["py", "pyw", "pyx", "pyi"],
        dependency_files: &[
            "requirements.txt",
            "Pipfile",
            "pyproject.toml",
            "setup.py",
            "environment.yml",
        ],
        config_files: &[
            ".pylintrc",
            "setup.cfg",
            "pyproject.toml",
            "tox.ini",
            ".flake8",
            "mypy.ini",
        ],
        test_patterns: &["test_*.py", "*_test.py", "tests/", "test/"],
        frameworks: &[
            ("django", &["django", "manage.py", "wsgi.py"]),
            ("flask", &["flask"]),
            ("fastapi", &["fastapi"]),
            ("pytest", &["pytest", "conftest.py"]),
        ],
    },
    Profile {
        name: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
        dependency_files: &["package.json", "package-lock.json", "yarn.lock"],
        config_files: &[".eslintrc", ".babelrc", "webpack.config.js", ".prettierrc"],
        test_patterns: &["*.test.js", "*.spec.js", "__tests__/", "test/"],
        frameworks: &[
            ("react", &["\"react\"", "src/App.js"]),
            ("vue", &["\"vue\"", "vue.config.js"]),
            ("angular", &["angular.json"]),
            ("express", &["\"express\""]),
            ("next", &["\"next\"", "next.config.js"]),
        ],
    },
    Profile {
        name: "typescript",
        extensions: &["ts", "tsx"],
        dependency_files: &["package.json", "package-lock.json", "yarn.lock"],
        config_files: &["tsconfig.json", "tslint.json", ".eslintrc.js"],
        test_patterns: &["*.test.ts", "*.spec.ts", "__tests__/"],
        frameworks: &[
            ("angular", &["@angular/core"]),
            ("react", &["@types/react", "src/App.tsx"]),
            ("vue", &["vue.config.ts"]),
            ("nest", &["@nestjs/core", "nest-cli.json"]),
        ],
    },
    Profile {
        name: "java",
        extensions: &["java", "kt", "scala"],
        dependency_files: &["pom.xml", "build.gradle", "build.gradle.kts"],
        config_files: &["application.properties", "application.yml", "logback.xml"],
        test_patterns: &["*Test.java", "*Tests.java", "src/test/"],
        frameworks: &[
            ("spring", &["spring-boot", "org.springframework"]),
            ("maven", &["<project"]),
            ("gradle", &["build.gradle"]),
        ],
    },
    Profile {
        name: "go",
        extensions: &["go"],
        dependency_files: &["go.mod", "go.sum", "Gopkg.toml"],
        config_files: &[".golangci.yml", "Makefile"],
        test_patterns: &["*_test.go"],
        frameworks: &[
            ("gin", &["gin-gonic/gin"]),
            ("echo", &["labstack/echo"]),
            ("fiber", &["gofiber/fiber"]),
        ],
    },
    Profile {
        name: "rust",
        extensions: &["rs"],
        dependency_files: &["Cargo.toml", "Cargo.lock"],
        config_files: &["rustfmt.toml", ".rustfmt.toml", "clippy.toml", "rust-toolchain.toml"],
        test_patterns: &["*_test.rs", "tests/"],
        frameworks: &[
            ("tokio", &["tokio"]),
            ("axum", &["axum"]),
            ("actix", &["actix-web"]),
            ("clap", &["clap"]),
            ("serde", &["serde"]),
        ],
    },
];

pub fn profile(name: &str) -> Option<&'static Profile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// Language owning a lowercased extension (without the dot).
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    PROFILES
        .iter()
        .find(|p| p.extensions.contains(&ext))
        .map(|p| p.name)
}

pub fn is_dependency_file(name: &str) -> bool {
    PROFILES.iter().any(|p| p.dependency_files.contains(&name))
}

pub fn is_config_file(name: &str) -> bool {
    PROFILES.iter().any(|p| p.config_files.contains(&name))
}

/// `relative` uses `/` separators.
pub fn is_test_file(name: &str, relative: &str) -> bool {
    PROFILES.iter().flat_map(|p| p.test_patterns).any(|pattern| {
        if let Some(dir) = pattern.strip_suffix('/') {
            relative
                .split('/')
                .rev()
                .skip(1)
                .any(|component| component == dir)
        } else if let Some((prefix, suffix)) = pattern.split_once('*') {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        } else {
            name == *pattern
        }
    })
}

pub fn is_documentation(ext: &str) -> bool {
    matches!(ext, "md" | "rst" | "txt" | "adoc" | "doc" | "docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_map_to_languages() {
        assert_eq!(language_for_extension("py"), Some("python"));
        assert_eq!(language_for_extension("tsx"), Some("typescript"));
        assert_eq!(language_for_extension("rs"), Some("rust"));
        assert_eq!(language_for_extension("md"), None);
    }

    #[test]
    fn special_files() {
        assert!(is_dependency_file("Cargo.toml"));
        assert!(is_dependency_file("go.mod"));
        assert!(!is_dependency_file("main.go"));
        assert!(is_config_file("tsconfig.json"));
        assert_eq!(profile("java").map(|p| p.extensions[0]), Some("java"));
    }

    #[test]
    fn test_file_patterns() {
        assert!(is_test_file("test_api.py", "pkg/test_api.py"));
        assert!(is_test_file("api_test.go", "api_test.go"));
        assert!(is_test_file("UserTest.java", "src/UserTest.java"));
        assert!(is_test_file("helpers.py", "tests/helpers.py"));
        assert!(is_test_file("Button.spec.ts", "src/Button.spec.ts"));
        assert!(!is_test_file("contest.py", "src/contest.py"));
        assert!(!is_test_file("tests", "tests"));
    }
}
