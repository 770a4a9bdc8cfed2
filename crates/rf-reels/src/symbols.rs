//! Symbol definitions and asset naming

use serde::{Deserialize, Serialize};

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SymbolKind {
    /// High paying symbol
    High = 0,
    /// Low paying symbol
    Low = 1,
    /// Scatter
    Scatter = 2,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDef {
    /// Symbol name (e.g., "H1", "L3", "Scatter")
    pub name: String,
    /// Symbol type
    pub kind: SymbolKind,
}

impl SymbolDef {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Path of the sharp texture
    pub fn texture_path(&self, asset_root: &str) -> String {
        format!("{}/{}.png", asset_root, self.name)
    }

    /// Path of the motion-blurred texture
    pub fn blurred_texture_path(&self, asset_root: &str) -> String {
        format!("{}/{}_blur.png", asset_root, self.name)
    }
}

/// Default directory holding symbol textures
pub const DEFAULT_SYMBOL_ROOT: &str = "assets/symbols";

/// Ordered symbol set. A symbol's position is its texture index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSet {
    /// Directory holding the symbol textures
    pub asset_root: String,
    /// Symbols in texture-table order
    pub symbols: Vec<SymbolDef>,
}

impl SymbolSet {
    /// Classic set: three high symbols, four low symbols and a scatter
    pub fn classic() -> Self {
        let symbols = vec![
            SymbolDef::new("H1", SymbolKind::High),
            SymbolDef::new("H2", SymbolKind::High),
            SymbolDef::new("H3", SymbolKind::High),
            SymbolDef::new("L1", SymbolKind::Low),
            SymbolDef::new("L2", SymbolKind::Low),
            SymbolDef::new("L3", SymbolKind::Low),
            SymbolDef::new("L4", SymbolKind::Low),
            SymbolDef::new("Scatter", SymbolKind::Scatter),
        ];

        Self {
            asset_root: DEFAULT_SYMBOL_ROOT.to_string(),
            symbols,
        }
    }

    /// Replace the asset directory
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get symbol by texture index
    pub fn get(&self, index: usize) -> Option<&SymbolDef> {
        self.symbols.get(index)
    }

    /// Texture index of a symbol name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s.name == name)
    }

    /// Sharp texture paths, in texture-table order
    pub fn texture_paths(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| s.texture_path(&self.asset_root))
            .collect()
    }

    /// Blurred texture paths, in texture-table order
    pub fn blurred_texture_paths(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| s.blurred_texture_path(&self.asset_root))
            .collect()
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_set() {
        let set = SymbolSet::classic();
        assert_eq!(set.len(), 8);
        assert_eq!(set.index_of("H1"), Some(0));
        assert_eq!(set.index_of("Scatter"), Some(7));
        assert_eq!(set.index_of("WILD"), None);
        assert_eq!(set.get(3).map(|s| s.kind), Some(SymbolKind::Low));
    }

    #[test]
    fn test_texture_paths_are_parallel() {
        let set = SymbolSet::classic();
        let sharp = set.texture_paths();
        let blurred = set.blurred_texture_paths();

        assert_eq!(sharp.len(), blurred.len());
        assert_eq!(sharp[0], "assets/symbols/H1.png");
        assert_eq!(blurred[0], "assets/symbols/H1_blur.png");
        assert_eq!(blurred[7], "assets/symbols/Scatter_blur.png");
    }

    #[test]
    fn test_custom_asset_root() {
        let set = SymbolSet::classic().with_asset_root("skins/neon");
        assert_eq!(set.texture_paths()[1], "skins/neon/H2.png");
    }
}
