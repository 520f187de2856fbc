use serde::{Deserialize, Serialize};

use crate::render::capability::{CapabilityContext, Profile};

/// How the capability profile is chosen at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSelection {
    /// Probe the context
    #[default]
    Auto,
    Desktop,
    Embedded,
}

impl ProfileSelection {
    pub fn resolve<C: CapabilityContext + ?Sized>(self, context: &C) -> Profile {
        match self {
            ProfileSelection::Auto => context.profile(),
            ProfileSelection::Desktop => Profile::Desktop,
            ProfileSelection::Embedded => Profile::Embedded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::capability::{StaticContext, Version};

    #[test]
    fn test_auto_probes_context() {
        let es = StaticContext::new(Version::GLES300);
        assert_eq!(ProfileSelection::Auto.resolve(&es), Profile::Embedded);
        assert_eq!(ProfileSelection::Desktop.resolve(&es), Profile::Desktop);

        let gl = StaticContext::new(Version::GL330);
        assert_eq!(ProfileSelection::Auto.resolve(&gl), Profile::Desktop);
    }
}
