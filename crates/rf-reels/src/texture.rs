//! Shared symbol texture table
//!
//! Two parallel tables (sharp, blurred) indexed by symbol index. Built once
//! at setup and shared read-only by every reel through an `Arc`.

use crate::error::{ReelError, ReelResult};
use crate::symbols::SymbolSet;

/// Source of drawable textures
///
/// Returns one texture per path, in the same order.
pub trait TextureProvider {
    type Texture;

    fn load(&self, paths: &[String]) -> ReelResult<Vec<Self::Texture>>;
}

/// Sharp and blurred textures per symbol index
#[derive(Debug, Clone)]
pub struct TextureTable<T> {
    sharp: Vec<T>,
    blurred: Vec<T>,
}

impl<T> TextureTable<T> {
    /// Create from two parallel texture lists
    pub fn new(sharp: Vec<T>, blurred: Vec<T>) -> ReelResult<Self> {
        if sharp.len() != blurred.len() {
            return Err(ReelError::TextureMismatch {
                sharp: sharp.len(),
                blurred: blurred.len(),
            });
        }
        if sharp.is_empty() {
            return Err(ReelError::EmptyTextureTable);
        }
        Ok(Self { sharp, blurred })
    }

    /// Load both variants of every symbol through a provider
    pub fn load<P>(provider: &P, symbols: &SymbolSet) -> ReelResult<Self>
    where
        P: TextureProvider<Texture = T>,
    {
        let sharp = provider.load(&symbols.texture_paths())?;
        let blurred = provider.load(&symbols.blurred_texture_paths())?;
        if sharp.len() != symbols.len() {
            return Err(ReelError::Asset(format!(
                "provider returned {} textures for {} symbols",
                sharp.len(),
                symbols.len()
            )));
        }
        log::debug!("Loaded {} symbol textures", sharp.len());
        Self::new(sharp, blurred)
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.sharp.len()
    }

    /// Always false once constructed
    pub fn is_empty(&self) -> bool {
        self.sharp.is_empty()
    }

    pub fn sharp(&self, symbol: usize) -> Option<&T> {
        self.sharp.get(symbol)
    }

    pub fn blurred(&self, symbol: usize) -> Option<&T> {
        self.blurred.get(symbol)
    }

    /// Texture variant for a symbol
    pub fn texture(&self, symbol: usize, blurred: bool) -> Option<&T> {
        if blurred {
            self.blurred(symbol)
        } else {
            self.sharp(symbol)
        }
    }
}

/// Provider that hands the path back as the texture
///
/// Used by the headless driver and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTextureProvider;

impl TextureProvider for PathTextureProvider {
    type Texture = String;

    fn load(&self, paths: &[String]) -> ReelResult<Vec<String>> {
        Ok(paths.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    impl TextureProvider for FailingProvider {
        type Texture = u32;

        fn load(&self, paths: &[String]) -> ReelResult<Vec<u32>> {
            Err(ReelError::Asset(format!("cannot load {}", paths[0])))
        }
    }

    #[test]
    fn test_table_rejects_mismatch() {
        let result = TextureTable::new(vec![1, 2, 3], vec![1, 2]);
        assert!(matches!(
            result,
            Err(ReelError::TextureMismatch { sharp: 3, blurred: 2 })
        ));
    }

    #[test]
    fn test_table_rejects_empty() {
        let result = TextureTable::<u8>::new(Vec::new(), Vec::new());
        assert!(matches!(result, Err(ReelError::EmptyTextureTable)));
    }

    #[test]
    fn test_texture_variants() {
        let table = TextureTable::new(vec!["a", "b"], vec!["a~", "b~"]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.texture(1, false), Some(&"b"));
        assert_eq!(table.texture(1, true), Some(&"b~"));
        assert_eq!(table.texture(2, true), None);
    }

    #[test]
    fn test_load_through_provider() {
        let table = TextureTable::load(&PathTextureProvider, &SymbolSet::classic()).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table.sharp(0).unwrap(), "assets/symbols/H1.png");
        assert_eq!(table.blurred(0).unwrap(), "assets/symbols/H1_blur.png");
    }

    #[test]
    fn test_load_propagates_provider_error() {
        let result = TextureTable::load(&FailingProvider, &SymbolSet::classic());
        assert!(matches!(result, Err(ReelError::Asset(_))));
    }
}
