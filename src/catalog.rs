//! Component catalog: the table of known component names, roles and
//! factories.
//!
//! Lookup is a linear scan in declaration order on the exact name; the
//! first matching entry wins. Roles are descriptive and only used by the
//! enumeration helpers, never to pick a factory.

use crate::component::{self, AppData, ComponentCallbacks, ComponentHandle};
use crate::error::Result;
use crate::session::Session;
use std::borrow::Cow;
use std::sync::Arc;

/// Constructor for one component kind.
pub type ComponentFactory =
    fn(&Session, AppData, Arc<dyn ComponentCallbacks>) -> Result<ComponentHandle>;

/// One row of the catalog.
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    /// Component name.
    pub name: &'static str,
    /// Standard role the component implements.
    pub role: &'static str,
    /// Constructor.
    pub factory: ComponentFactory,
}

impl CatalogEntry {
    /// Create an entry.
    pub const fn new(name: &'static str, role: &'static str, factory: ComponentFactory) -> Self {
        Self {
            name,
            role,
            factory,
        }
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// The built-in DSP components.
pub static BUILTIN_COMPONENTS: &[CatalogEntry] = &[
    CatalogEntry::new("OMX.xa.aac.decoder", "audio_decoder.aac", component::create_aac_decoder),
    CatalogEntry::new("OMX.xa.mp3.decoder", "audio_decoder.mp3", component::create_mp3_decoder),
    CatalogEntry::new("OMX.xa.aac.encoder", "audio_encoder.aac", component::create_aac_encoder),
    CatalogEntry::new(
        "OMX.xa.vorbis.decoder",
        "audio_decoder.vorbis",
        component::create_vorbis_decoder,
    ),
    CatalogEntry::new(
        "OMX.RENESAS.AUDIO.DSP.RENDERER",
        "audio_renderer.pcm",
        component::create_renderer,
    ),
    CatalogEntry::new(
        "OMX.RENESAS.AUDIO.DSP.CAPTURE",
        "audio_capture.pcm",
        component::create_capture,
    ),
    CatalogEntry::new(
        "OMX.RENESAS.AUDIO.DSP.EQUALIZER",
        "audio_processor.pcm.equalizer",
        component::create_equalizer,
    ),
    CatalogEntry::new(
        "OMX.RENESAS.AUDIO.DSP.TDMRENDERER",
        "audio_tdm_renderer.pcm",
        component::create_tdm_renderer,
    ),
    CatalogEntry::new(
        "OMX.RENESAS.AUDIO.DSP.TDMCAPTURE",
        "audio_tdm_capture.pcm",
        component::create_tdm_capture,
    ),
];

/// Immutable table of component entries.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Cow<'static, [CatalogEntry]>,
}

impl Catalog {
    /// The catalog of built-in components.
    pub fn builtin() -> Self {
        Self::from_static(BUILTIN_COMPONENTS)
    }

    /// A catalog over a static table.
    pub const fn from_static(entries: &'static [CatalogEntry]) -> Self {
        Self {
            entries: Cow::Borrowed(entries),
        }
    }

    /// A catalog over an owned table, in the given order.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Cow::Owned(entries),
        }
    }

    /// Find the first entry named exactly `name`.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Name of the entry at `index`, for enumerating components.
    pub fn name_at(&self, index: usize) -> Option<&'static str> {
        self.entries.get(index).map(|e| e.name)
    }

    /// Roles implemented by the components named `name`.
    pub fn roles_of(&self, name: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.role)
            .collect()
    }

    /// Names of the components implementing `role`.
    pub fn components_of_role(&self, role: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.role == role)
            .map(|e| e.name)
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OmxError;

    fn refuse(
        _session: &Session,
        _app_data: AppData,
        _callbacks: Arc<dyn ComponentCallbacks>,
    ) -> Result<ComponentHandle> {
        Err(OmxError::NotImplemented)
    }

    #[test]
    fn test_builtin_table() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.name_at(0), Some("OMX.xa.aac.decoder"));
        assert_eq!(catalog.name_at(8), Some("OMX.RENESAS.AUDIO.DSP.TDMCAPTURE"));
        assert_eq!(catalog.name_at(9), None);

        let mp3 = catalog.lookup("OMX.xa.mp3.decoder").unwrap();
        assert_eq!(mp3.role, "audio_decoder.mp3");
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = Catalog::builtin();
        assert!(catalog.lookup("OMX.XA.MP3.DECODER").is_none());
        assert!(catalog.lookup("OMX.xa.mp3").is_none());
        assert!(catalog.lookup("OMX.xa.mp3.decoder ").is_none());
        assert!(catalog.lookup("").is_none());
    }

    #[test]
    fn test_lookup_is_stable() {
        let catalog = Catalog::builtin();
        let first = catalog.lookup("OMX.RENESAS.AUDIO.DSP.RENDERER").unwrap();
        let second = catalog.lookup("OMX.RENESAS.AUDIO.DSP.RENDERER").unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_first_match_wins() {
        let catalog = Catalog::from_entries(vec![
            CatalogEntry::new("dup", "role.first", refuse),
            CatalogEntry::new("dup", "role.second", refuse),
        ]);
        assert_eq!(catalog.lookup("dup").unwrap().role, "role.first");
        assert_eq!(catalog.roles_of("dup"), ["role.first", "role.second"]);
    }

    #[test]
    fn test_roles_and_components() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.roles_of("OMX.RENESAS.AUDIO.DSP.EQUALIZER"),
            ["audio_processor.pcm.equalizer"]
        );
        assert!(catalog.roles_of("OMX.nonexistent").is_empty());
        assert_eq!(
            catalog.components_of_role("audio_decoder.vorbis"),
            ["OMX.xa.vorbis.decoder"]
        );
        assert!(catalog.components_of_role("video_decoder.avc").is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::from_entries(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.lookup("OMX.xa.mp3.decoder").is_none());
    }
}
