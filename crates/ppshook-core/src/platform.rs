use std::collections::HashMap;

use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct PlatformDescriptor {
    pub canonical: &'static str,
    pub codes: &'static [&'static str],
}

static PLATFORMS: Lazy<Vec<PlatformDescriptor>> = Lazy::new(|| {
    vec![
        PlatformDescriptor {
            canonical: "Suomi-NPP",
            codes: &["npp", "suomi-npp", "snpp"],
        },
        PlatformDescriptor {
            canonical: "NOAA-20",
            codes: &["noaa20", "noaa-20", "j01", "jpss-1"],
        },
        PlatformDescriptor {
            canonical: "NOAA-21",
            codes: &["noaa21", "noaa-21", "j02", "jpss-2"],
        },
        PlatformDescriptor {
            canonical: "NOAA-18",
            codes: &["noaa18", "noaa-18"],
        },
        PlatformDescriptor {
            canonical: "NOAA-19",
            codes: &["noaa19", "noaa-19"],
        },
        PlatformDescriptor {
            canonical: "Metop-A",
            codes: &["metop02", "metopa", "metop-a"],
        },
        PlatformDescriptor {
            canonical: "Metop-B",
            codes: &["metop01", "metopb", "metop-b"],
        },
        PlatformDescriptor {
            canonical: "Metop-C",
            codes: &["metop03", "metopc", "metop-c"],
        },
        PlatformDescriptor {
            canonical: "EOS-Terra",
            codes: &["eos1", "terra", "eos-terra"],
        },
        PlatformDescriptor {
            canonical: "EOS-Aqua",
            codes: &["eos2", "aqua", "eos-aqua"],
        },
    ]
});

static BY_CODE: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut lookup = HashMap::new();
    for descriptor in PLATFORMS.iter() {
        lookup.insert(descriptor.canonical.to_ascii_lowercase(), descriptor.canonical);
        for code in descriptor.codes {
            lookup.insert(code.to_string(), descriptor.canonical);
        }
    }
    lookup
});

pub fn all_platforms() -> &'static [PlatformDescriptor] {
    PLATFORMS.as_slice()
}

/// Maps a raw platform code to its display name. Unknown codes come back
/// unchanged.
pub fn normalize_platform_name(raw: &str) -> String {
    match BY_CODE.get(raw.trim().to_ascii_lowercase().as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_codes() {
        assert_eq!(normalize_platform_name("npp"), "Suomi-NPP");
        assert_eq!(normalize_platform_name("noaa20"), "NOAA-20");
        assert_eq!(normalize_platform_name("metop01"), "Metop-B");
        assert_eq!(normalize_platform_name("EOS2"), "EOS-Aqua");
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        for descriptor in all_platforms() {
            assert_eq!(
                normalize_platform_name(descriptor.canonical),
                descriptor.canonical
            );
        }
        assert_eq!(normalize_platform_name("NOAA-20"), "NOAA-20");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(normalize_platform_name("Meteosat-11"), "Meteosat-11");
        assert_eq!(normalize_platform_name(""), "");
    }
}
