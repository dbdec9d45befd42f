use std::collections::HashMap;

pub struct TemplateContext<'a> {
    pub path: &'a str,
    pub file_name: &'a str,
    pub stem: &'a str,
}

impl<'a> TemplateContext<'a> {
    pub fn new(path: &'a str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let stem = match file_name.rfind('.') {
            Some(0) | None => file_name,
            Some(i) => &file_name[..i],
        };
        Self {
            path,
            file_name,
            stem,
        }
    }

    fn extension(&self) -> Option<String> {
        match self.file_name.rfind('.') {
            Some(0) | None => None,
            Some(i) => Some(self.file_name[i + 1..].to_lowercase()),
        }
    }
}

pub type TemplateFn = fn(&TemplateContext) -> String;

fn empty(_: &TemplateContext) -> String {
    String::new()
}

fn python(ctx: &TemplateContext) -> String {
    if ctx.file_name == "__init__.py" {
        return String::new();
    }
    format!(
        "\"\"\"{}.\"\"\"\n\n\ndef main():\n    pass\n\n\nif __name__ == \"__main__\":\n    main()\n",
        ctx.stem
    )
}

fn rust(ctx: &TemplateContext) -> String {
    if ctx.file_name == "main.rs" {
        "fn main() {\n    println!(\"Hello, world!\");\n}\n".to_string()
    } else {
        String::new()
    }
}

fn javascript(ctx: &TemplateContext) -> String {
    format!("// {}\n\n'use strict';\n", ctx.path)
}

fn typescript(ctx: &TemplateContext) -> String {
    format!("// {}\n\nexport {{}};\n", ctx.path)
}

fn php(ctx: &TemplateContext) -> String {
    format!("<?php\n// {}\n", ctx.path)
}

fn html(ctx: &TemplateContext) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>{}</title>\n</head>\n<body>\n</body>\n</html>\n",
        ctx.stem
    )
}

fn css(ctx: &TemplateContext) -> String {
    format!("/* {} */\n", ctx.path)
}

fn markdown(ctx: &TemplateContext) -> String {
    format!("# {}\n", ctx.stem)
}

fn shell(_: &TemplateContext) -> String {
    "#!/usr/bin/env sh\nset -eu\n".to_string()
}

fn json(_: &TemplateContext) -> String {
    "{}\n".to_string()
}

fn go(ctx: &TemplateContext) -> String {
    let package = if ctx.stem == "main" { "main" } else { "pkg" };
    format!("package {}\n", package)
}

fn gitignore(_: &TemplateContext) -> String {
    ".env\n*.log\n".to_string()
}

fn dotenv(_: &TemplateContext) -> String {
    "# KEY=value\n".to_string()
}

fn dockerfile(_: &TemplateContext) -> String {
    "FROM scratch\n".to_string()
}

fn makefile(_: &TemplateContext) -> String {
    ".PHONY: all\nall:\n".to_string()
}

/// File content lookup by file name first, then by lowercase extension,
/// then the fallback.
pub struct TemplateRegistry {
    by_name: HashMap<String, TemplateFn>,
    by_extension: HashMap<String, TemplateFn>,
    fallback: TemplateFn,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for &(ext, f) in DEFAULT_EXTENSIONS {
            registry.register_extension(ext, f);
        }
        registry.register_name(".gitignore", gitignore);
        registry.register_name(".env", dotenv);
        registry.register_name("Dockerfile", dockerfile);
        registry.register_name("Makefile", makefile);
        registry
    }
}

const DEFAULT_EXTENSIONS: &[(&str, TemplateFn)] = &[
    ("py", python),
    ("rs", rust),
    ("js", javascript),
    ("mjs", javascript),
    ("jsx", javascript),
    ("ts", typescript),
    ("tsx", typescript),
    ("php", php),
    ("html", html),
    ("htm", html),
    ("css", css),
    ("scss", css),
    ("md", markdown),
    ("sh", shell),
    ("json", json),
    ("go", go),
];

impl TemplateRegistry {
    /// A registry that renders every file empty.
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_extension: HashMap::new(),
            fallback: empty,
        }
    }

    pub fn register_extension(&mut self, ext: &str, f: TemplateFn) {
        self.by_extension
            .insert(ext.trim_start_matches('.').to_lowercase(), f);
    }

    pub fn register_name(&mut self, name: &str, f: TemplateFn) {
        self.by_name.insert(name.to_string(), f);
    }

    pub fn set_fallback(&mut self, f: TemplateFn) {
        self.fallback = f;
    }

    pub fn render(&self, path: &str) -> String {
        let ctx = TemplateContext::new(path);
        let template = self
            .by_name
            .get(ctx.file_name)
            .or_else(|| ctx.extension().and_then(|e| self.by_extension.get(&e)))
            .copied()
            .unwrap_or(self.fallback);
        template(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_splits_name_and_stem() {
        let ctx = TemplateContext::new("src/app/main.py");
        assert_eq!(ctx.file_name, "main.py");
        assert_eq!(ctx.stem, "main");
        assert_eq!(ctx.extension().as_deref(), Some("py"));

        let dotfile = TemplateContext::new(".env");
        assert_eq!(dotfile.stem, ".env");
        assert_eq!(dotfile.extension(), None);
    }

    #[test]
    fn extension_lookup_ignores_case() {
        let registry = TemplateRegistry::default();
        assert_eq!(registry.render("a/README.MD"), "# README\n");
        assert!(registry.render("index.php").starts_with("<?php"));
    }

    #[test]
    fn unknown_extension_uses_fallback() {
        let mut registry = TemplateRegistry::default();
        assert_eq!(registry.render("data.bin"), "");
        registry.set_fallback(|ctx| format!("{}\n", ctx.path));
        assert_eq!(registry.render("data.bin"), "data.bin\n");
    }

    #[test]
    fn file_name_beats_extension() {
        let registry = TemplateRegistry::default();
        assert_eq!(registry.render("docker/Dockerfile"), "FROM scratch\n");
        assert_eq!(registry.render("pkg/__init__.py"), "");
    }
}
