//! Import reference resolution.
//!
//! Rewrites `import` statements so that every import is bound to a concrete
//! account address. Imports are resolved against the contracts of the same
//! run first and the network's alias table second.

use std::collections::HashMap;

use super::{AliasTable, ContractSpec};
use crate::error::DeployError;
use crate::types::Address;

/// Where an import statement points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLocation {
    /// `import Name from "./Name.cdc"`
    File(String),
    /// `import "Name"`
    Name,
    /// `import Name from 0x01`
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub names: Vec<String>,
    pub location: ImportLocation,
}

impl ImportStatement {
    /// Whether this import still needs an address.
    pub fn is_unbound(&self) -> bool {
        !matches!(self.location, ImportLocation::Address(_))
    }
}

/// Source text with imports rewritten, plus the in-run contracts it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub code: String,
    pub dependencies: Vec<String>,
}

/// Binds import names to addresses for one deployment run.
#[derive(Debug)]
pub struct ImportResolver<'a> {
    aliases: &'a AliasTable,
    targets: HashMap<&'a str, Address>,
}

impl<'a> ImportResolver<'a> {
    pub fn new(aliases: &'a AliasTable, contracts: &'a [ContractSpec]) -> Self {
        let targets = contracts
            .iter()
            .map(|c| (c.name.as_str(), c.address))
            .collect();
        Self { aliases, targets }
    }

    /// Resolve every import in `source`, which belongs to `contract`.
    pub fn resolve(&self, contract: &str, source: &str) -> Result<ResolvedSource, DeployError> {
        let mut code = String::with_capacity(source.len());
        let mut dependencies: Vec<String> = Vec::new();

        for line in source.split_inclusive('\n') {
            let (content, ending) = split_line_ending(line);
            let import = match classify_line(content) {
                ImportLine::Statement(import) if import.is_unbound() => import,
                ImportLine::Malformed => {
                    return Err(DeployError::MalformedImport {
                        contract: contract.to_string(),
                        line: content.trim().to_string(),
                    });
                }
                _ => {
                    code.push_str(line);
                    continue;
                }
            };

            let indent = &content[..content.len() - content.trim_start().len()];
            let mut rewritten = Vec::with_capacity(import.names.len());
            for name in &import.names {
                let address = if let Some(address) = self.targets.get(name.as_str()) {
                    if !dependencies.contains(name) {
                        dependencies.push(name.clone());
                    }
                    *address
                } else if let Some(address) = self.aliases.get(name) {
                    address
                } else {
                    return Err(DeployError::UnresolvedImport {
                        contract: contract.to_string(),
                        import: name.clone(),
                    });
                };
                rewritten.push(format!("{}import {} from {}", indent, name, address));
            }

            code.push_str(&rewritten.join("\n"));
            code.push_str(ending);
        }

        Ok(ResolvedSource { code, dependencies })
    }
}

/// How a single source line reads with respect to imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLine {
    /// Not an import statement
    Other,
    /// `import Crypto`: a built-in contract that needs no address
    BuiltIn,
    Statement(ImportStatement),
    /// Starts with the `import` keyword but has no recognisable shape
    Malformed,
}

/// All import statements found in `source`, in order.
pub fn parse_imports(source: &str) -> Vec<ImportStatement> {
    source.lines().filter_map(parse_import).collect()
}

/// Parse a single line as an import statement.
///
/// Bare identifier imports without a location (`import Crypto`) refer to
/// built-in contracts and are not reported.
pub fn parse_import(line: &str) -> Option<ImportStatement> {
    match classify_line(line) {
        ImportLine::Statement(import) => Some(import),
        _ => None,
    }
}

/// Classify one line. A trailing `;` and `// comment` are ignored.
pub fn classify_line(line: &str) -> ImportLine {
    let Some(rest) = line.trim().strip_prefix("import") else {
        return ImportLine::Other;
    };
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '"') {
        return ImportLine::Other;
    }

    let rest = strip_terminator(rest).trim();
    if is_identifier(rest) {
        return ImportLine::BuiltIn;
    }
    match parse_statement(rest) {
        Some(import) => ImportLine::Statement(import),
        None => ImportLine::Malformed,
    }
}

fn parse_statement(rest: &str) -> Option<ImportStatement> {
    if let Some(name) = unquote(rest) {
        return is_identifier(name).then(|| ImportStatement {
            names: vec![name.to_string()],
            location: ImportLocation::Name,
        });
    }

    let (names_part, location_part) = rest.split_once(" from ")?;
    let names: Vec<String> = names_part
        .split(',')
        .map(|n| n.trim().to_string())
        .collect();
    if names.iter().any(|n| !is_identifier(n)) {
        return None;
    }

    let location_part = location_part.trim();
    let location = if let Some(path) = unquote(location_part) {
        if path.is_empty() {
            return None;
        }
        ImportLocation::File(path.to_string())
    } else {
        let digits = location_part.strip_prefix("0x")?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        ImportLocation::Address(location_part.to_string())
    };

    Some(ImportStatement { names, location })
}

/// Drop a trailing line comment and statement terminator.
fn strip_terminator(text: &str) -> &str {
    let mut in_quotes = false;
    let mut end = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '/' if !in_quotes && text[i + 1..].starts_with('/') => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let text = text[..end].trim_end();
    text.strip_suffix(';').unwrap_or(text).trim_end()
}

fn unquote(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, address: &str) -> ContractSpec {
        ContractSpec {
            name: name.to_string(),
            account_name: "acct".to_string(),
            address: address.parse().unwrap(),
            location: format!("{}.cdc", name),
            args: Vec::new(),
        }
    }

    #[test]
    fn parses_supported_import_forms() {
        let imports = parse_imports(
            "import A from \"./A.cdc\"\n  import \"B\"\nimport C from 0x01\nimport Crypto\n// import D from \"./D.cdc\"\n",
        );
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].location, ImportLocation::File("./A.cdc".into()));
        assert_eq!(imports[1].names, vec!["B".to_string()]);
        assert_eq!(imports[1].location, ImportLocation::Name);
        assert_eq!(imports[2].location, ImportLocation::Address("0x01".into()));
        assert!(!imports[2].is_unbound());
    }

    #[test]
    fn ignores_identifiers_that_start_with_import() {
        assert!(parse_import("importantValue = 1").is_none());
    }

    #[test]
    fn resolves_against_run_contracts_and_records_dependency() {
        let contracts = vec![spec("A", "01")];
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);

        let resolved = resolver
            .resolve("B", "import A from \"./A.cdc\"\r\naccess(all) contract B {}")
            .unwrap();
        assert_eq!(
            resolved.code,
            "import A from 0x0000000000000001\r\naccess(all) contract B {}"
        );
        assert_eq!(resolved.dependencies, vec!["A".to_string()]);
    }

    #[test]
    fn alias_resolution_adds_no_dependency() {
        let contracts: Vec<ContractSpec> = Vec::new();
        let mut aliases = AliasTable::new();
        aliases.insert("FungibleToken", "0xf233dcee88fe0abe".parse().unwrap());
        let resolver = ImportResolver::new(&aliases, &contracts);

        let resolved = resolver
            .resolve("Token", "    import \"FungibleToken\"\n")
            .unwrap();
        assert_eq!(resolved.code, "    import FungibleToken from 0xf233dcee88fe0abe\n");
        assert!(resolved.dependencies.is_empty());
    }

    #[test]
    fn run_contract_takes_precedence_over_alias() {
        let contracts = vec![spec("A", "02")];
        let mut aliases = AliasTable::new();
        aliases.insert("A", "0x0a".parse().unwrap());
        let resolver = ImportResolver::new(&aliases, &contracts);

        let resolved = resolver.resolve("B", "import \"A\"").unwrap();
        assert_eq!(resolved.code, "import A from 0x0000000000000002");
        assert_eq!(resolved.dependencies, vec!["A".to_string()]);
    }

    #[test]
    fn unresolved_import_names_contract_and_alias() {
        let contracts: Vec<ContractSpec> = Vec::new();
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);

        let err = resolver.resolve("B", "import Missing from \"./Missing.cdc\"").unwrap_err();
        match err {
            DeployError::UnresolvedImport { contract, import } => {
                assert_eq!(contract, "B");
                assert_eq!(import, "Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn address_imports_are_left_untouched() {
        let contracts: Vec<ContractSpec> = Vec::new();
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);
        let source = "import Existing from 0x01\nimport Crypto\n";
        let resolved = resolver.resolve("B", source).unwrap();
        assert_eq!(resolved.code, source);
    }

    #[test]
    fn repeated_imports_yield_one_dependency() {
        let contracts = vec![spec("A", "01")];
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);
        let resolved = resolver
            .resolve("B", "import A from \"./A.cdc\"\nimport \"A\"\n")
            .unwrap();
        assert_eq!(resolved.dependencies, vec!["A".to_string()]);
    }

    #[test]
    fn semicolon_and_trailing_comment_are_ignored() {
        let contracts = vec![spec("A", "01")];
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);

        for source in [
            "import A from \"./A.cdc\";\n",
            "import A from \"./A.cdc\" // shared vault\n",
            "import \"A\"; // by name\n",
        ] {
            let resolved = resolver.resolve("B", source).unwrap();
            assert_eq!(resolved.code, "import A from 0x0000000000000001\n");
            assert_eq!(resolved.dependencies, vec!["A".to_string()]);
        }
    }

    #[test]
    fn terminated_import_of_unknown_contract_is_unresolved() {
        let contracts: Vec<ContractSpec> = Vec::new();
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);

        let err = resolver
            .resolve("B", "import Missing from \"./Missing.cdc\";")
            .unwrap_err();
        assert!(matches!(err, DeployError::UnresolvedImport { import, .. } if import == "Missing"));
    }

    #[test]
    fn unrecognised_import_line_is_rejected() {
        let contracts = vec![spec("A", "01")];
        let aliases = AliasTable::new();
        let resolver = ImportResolver::new(&aliases, &contracts);

        for line in [
            "import A from ./A.cdc",
            "import A from \"./A.cdc",
            "import A B from \"./A.cdc\"",
        ] {
            let err = resolver.resolve("B", line).unwrap_err();
            match err {
                DeployError::MalformedImport { contract, line: reported } => {
                    assert_eq!(contract, "B");
                    assert_eq!(reported, line);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn classifies_lines() {
        assert_eq!(classify_line("access(all) contract A {}"), ImportLine::Other);
        assert_eq!(classify_line("// import A from \"./A.cdc\""), ImportLine::Other);
        assert_eq!(classify_line("import Crypto;"), ImportLine::BuiltIn);
        assert_eq!(classify_line("import A from"), ImportLine::Malformed);
        assert_eq!(
            classify_line("import A, B from 0x01; // both"),
            ImportLine::Statement(ImportStatement {
                names: vec!["A".to_string(), "B".to_string()],
                location: ImportLocation::Address("0x01".to_string()),
            })
        );
    }
}
