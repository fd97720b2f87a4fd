//! C header/source rendering of a finalized DCD
//!
//! The header exposes element and group index macros plus vendor model
//! identifiers; the source holds Composition Data Page 0 as a byte array
//! (all multi-byte fields little-endian).

use btmesh_dcd_core::{to_c_macro, Dcd};
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;
use tracing::warn;

use crate::config::CompositionConfig;

const BANNER: &str = "/* Generated by btmesh-dcdgen. Do not edit. */";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Element '{element}' has {count} {kind} models, more than fit in Page 0")]
    TooManyModels {
        element: String,
        kind: &'static str,
        count: usize,
    },
    #[error("Formatting error: {0}")]
    FmtError(#[from] std::fmt::Error),
}

/// Render the header declaring index macros and the page 0 array
pub fn render_header(dcd: &Dcd, header_name: &str) -> Result<String, RenderError> {
    let guard = to_c_macro(header_name);
    let mut out = String::new();

    writeln!(out, "{}", BANNER)?;
    writeln!(out, "#ifndef {}", guard)?;
    writeln!(out, "#define {}", guard)?;
    writeln!(out)?;
    writeln!(out, "#include <stddef.h>")?;
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out)?;
    writeln!(out, "#define SL_BTMESH_DCD_CID {:#06x}", dcd.cid)?;
    writeln!(out, "#define SL_BTMESH_DCD_PID {:#06x}", dcd.pid)?;
    writeln!(out, "#define SL_BTMESH_DCD_VID {:#06x}", dcd.vid)?;
    writeln!(out, "#define SL_BTMESH_DCD_NUM_ELEMENTS {}", dcd.total_elements())?;
    writeln!(out, "#define SL_BTMESH_DCD_NUM_MODELS {}", dcd.total_models())?;

    let mut defined: HashMap<String, String> = HashMap::new();

    writeln!(out)?;
    writeln!(out, "/* Element indices */")?;
    for (index, element) in dcd.elements.iter().enumerate() {
        for name in element.macros() {
            define(&mut out, &mut defined, name, index.to_string())?;
        }
    }

    writeln!(out)?;
    writeln!(out, "/* Group element indices */")?;
    for (index, element) in dcd.elements.iter().enumerate() {
        for name in element.group_macros() {
            define(&mut out, &mut defined, name, index.to_string())?;
        }
    }

    writeln!(out)?;
    writeln!(out, "/* Vendor models */")?;
    for model in &dcd.unique_vendor_models {
        let name = model.macro_name();
        define(
            &mut out,
            &mut defined,
            format!("{}_MODEL_ID", name),
            format!("{:#06x}", model.mid),
        )?;
        define(
            &mut out,
            &mut defined,
            format!("{}_COMPANY_ID", name),
            format!("{:#06x}", model.cid),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "extern const uint8_t sl_btmesh_dcd_page0[];")?;
    writeln!(out, "extern const size_t sl_btmesh_dcd_page0_len;")?;
    writeln!(out)?;
    writeln!(out, "#endif /* {} */", guard)?;
    Ok(out)
}

/// Emit `#define name value` once; warn when a name is reused for another value
///
/// The first value stays the reference for later repeats.
fn define(
    out: &mut String,
    defined: &mut HashMap<String, String>,
    name: String,
    value: String,
) -> Result<(), RenderError> {
    match defined.get(&name) {
        Some(existing) if *existing == value => return Ok(()),
        Some(existing) => {
            warn!(
                macro_name = %name,
                first = %existing,
                second = %value,
                "Macro defined twice with different values"
            );
        }
        None => {}
    }
    writeln!(out, "#define {} {}", name, value)?;
    defined.entry(name).or_insert(value);
    Ok(())
}

/// Render the source holding the Composition Data Page 0 bytes
pub fn render_source(
    dcd: &Dcd,
    composition: &CompositionConfig,
    header_name: &str,
) -> Result<String, RenderError> {
    let mut out = String::new();

    writeln!(out, "{}", BANNER)?;
    writeln!(out, "#include \"{}\"", header_name)?;
    writeln!(out)?;
    writeln!(out, "const uint8_t sl_btmesh_dcd_page0[] = {{")?;

    writeln!(out, "  /* CID, PID, VID, CRPL, Features */")?;
    let mut header = Vec::new();
    for field in [dcd.cid, dcd.pid, dcd.vid, composition.crpl, composition.features] {
        header.extend_from_slice(&field.to_le_bytes());
    }
    write_bytes(&mut out, &header)?;

    for (index, element) in dcd.elements.iter().enumerate() {
        let num_s = model_count(&element.name, "SIG", element.num_sig())?;
        let num_v = model_count(&element.name, "vendor", element.num_vendor())?;

        writeln!(
            out,
            "  /* Element {}: {} (loc {:#06x}, {} SIG, {} vendor) */",
            index,
            comment_text(&element.name),
            element.location,
            num_s,
            num_v
        )?;
        let mut bytes = element.location.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[num_s, num_v]);
        write_bytes(&mut out, &bytes)?;

        for model in &element.sig_models {
            write_bytes(&mut out, &model.mid.to_le_bytes())?;
        }
        for model in &element.vendor_models {
            let mut bytes = model.cid.to_le_bytes().to_vec();
            bytes.extend_from_slice(&model.mid.to_le_bytes());
            write_bytes(&mut out, &bytes)?;
        }
    }

    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(
        out,
        "const size_t sl_btmesh_dcd_page0_len = sizeof(sl_btmesh_dcd_page0);"
    )?;
    Ok(out)
}

fn model_count(element: &str, kind: &'static str, count: usize) -> Result<u8, RenderError> {
    u8::try_from(count).map_err(|_| RenderError::TooManyModels {
        element: element.to_string(),
        kind,
        count,
    })
}

/// Keep free text from terminating the surrounding `/* */` comment
fn comment_text(text: &str) -> String {
    text.replace("*/", "* /")
}

fn write_bytes(out: &mut String, bytes: &[u8]) -> Result<(), RenderError> {
    let line: Vec<String> = bytes.iter().map(|b| format!("{:#04x}", b)).collect();
    writeln!(out, "  {},", line.join(", "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use btmesh_dcd_core::{Element, SigModel, Source, VendorModel};

    fn sample_dcd() -> Dcd {
        let mut dcd = Dcd::new(0x02FF, 0x0001, 0x0002);

        let mut main = Element::new("main", 0x0100);
        main.sig_models.push(SigModel::new(0x1000, "Generic OnOff Server"));
        main.vendor_models.push(VendorModel::new(0x0001, 0x02FF, "Vendor Server"));
        main.sources.push(Source::new("light", Some("ctl".to_string())));
        main.sources.push(Source::new("light", Some("ctl".to_string())));

        let mut aux = Element::new("aux", 0x0101);
        aux.sig_models.push(SigModel::new(0x1002, "Generic Level Server"));
        aux.sources.push(Source::new("sensor", None));

        dcd.elements = vec![main, aux];
        dcd.finalize();
        dcd
    }

    #[test]
    fn test_header_macros() {
        let header = render_header(&sample_dcd(), "sl_btmesh_dcd.h").unwrap();

        assert!(header.contains("#ifndef SL_BTMESH_DCD_H\n#define SL_BTMESH_DCD_H\n"));
        assert!(header.contains("#define SL_BTMESH_DCD_CID 0x02ff\n"));
        assert!(header.contains("#define SL_BTMESH_DCD_NUM_ELEMENTS 2\n"));
        assert!(header.contains("#define SL_BTMESH_DCD_NUM_MODELS 3\n"));
        assert!(header.contains("#define SENSOR_AUX 1\n"));
        assert!(header.contains("#define LIGHT_GROUP_CTL_ELEM_INDEX 0\n"));
        assert!(header.contains("#define VENDOR_SERVER_MODEL_ID 0x0001\n"));
        assert!(header.contains("#define VENDOR_SERVER_COMPANY_ID 0x02ff\n"));
        // Both sources of "main" come from the same file
        assert_eq!(header.matches("#define LIGHT_MAIN 0\n").count(), 1);
        assert!(header.ends_with("#endif /* SL_BTMESH_DCD_H */\n"));
    }

    #[test]
    fn test_source_page0_bytes() {
        let composition = CompositionConfig {
            crpl: 0x0020,
            features: 0x0003,
        };
        let source = render_source(&sample_dcd(), &composition, "sl_btmesh_dcd.h").unwrap();

        assert!(source.contains("#include \"sl_btmesh_dcd.h\"\n"));
        assert!(source.contains(
            "  0xff, 0x02, 0x01, 0x00, 0x02, 0x00, 0x20, 0x00, 0x03, 0x00,\n"
        ));
        assert!(source.contains("  /* Element 0: main (loc 0x0100, 1 SIG, 1 vendor) */\n"));
        assert!(source.contains("  0x00, 0x01, 0x01, 0x01,\n"));
        assert!(source.contains("  0x00, 0x10,\n"));
        assert!(source.contains("  0xff, 0x02, 0x01, 0x00,\n"));
        assert!(source.contains("  /* Element 1: aux (loc 0x0101, 1 SIG, 0 vendor) */\n"));
    }

    #[test]
    fn test_element_name_cannot_close_comment() {
        let mut dcd = Dcd::new(1, 2, 3);
        dcd.elements.push(Element::new("main */ int x = ", 0));

        let source = render_source(&dcd, &CompositionConfig::default(), "dcd.h").unwrap();
        assert!(source.contains("  /* Element 0: main * / int x =  (loc 0x0000, 0 SIG, 0 vendor) */\n"));
        for line in source.lines().filter(|l| l.trim_start().starts_with("/*")) {
            assert_eq!(line.matches("*/").count(), 1, "{}", line);
        }
    }

    #[test]
    fn test_vendor_macro_collision_emitted_once_per_value() {
        let mut dcd = Dcd::new(1, 2, 3);
        dcd.unique_vendor_models = vec![
            VendorModel::new(0x0001, 0x02FF, "a-b"),
            VendorModel::new(0x0002, 0x02FF, "a b"),
            VendorModel::new(0x0001, 0x02FF, "a.b"),
        ];

        let header = render_header(&dcd, "dcd.h").unwrap();
        assert_eq!(header.matches("#define A_B_MODEL_ID 0x0001\n").count(), 1);
        assert_eq!(header.matches("#define A_B_MODEL_ID 0x0002\n").count(), 1);
        // Same company ID under the same name is a harmless repeat
        assert_eq!(header.matches("#define A_B_COMPANY_ID 0x02ff\n").count(), 1);
    }

    #[test]
    fn test_too_many_models() {
        let mut dcd = Dcd::new(1, 2, 3);
        let mut big = Element::new("big", 0);
        big.sig_models = (0..300u16).map(|mid| SigModel::new(mid, "m")).collect();
        dcd.elements.push(big);

        let err = render_source(&dcd, &CompositionConfig::default(), "dcd.h").unwrap_err();
        assert!(matches!(err, RenderError::TooManyModels { count: 300, .. }));
    }
}
