// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selective extraction of the records a set of roots depends on.

use crate::config::ImportSettings;
use crate::document::{Document, Records};
use indexmap::IndexSet;

/// Specific brush slots of a line set and the flag gating each
const SPECIFIC_BRUSHES: [(&str, &str); 16] = [
    ("VOutline", "VOutlineSpecificOn"),
    ("VObject", "VObjectSpecificOn"),
    ("VIntersection", "VIntersectionSpecificOn"),
    ("VSmooth", "VSmoothSpecificOn"),
    ("VMaterial", "VMaterialSpecificOn"),
    ("VSelected", "VSelectedSpecificOn"),
    ("VNormalAngle", "VNormalAngleSpecificOn"),
    ("VWireframe", "VWireframeSpecificOn"),
    ("HOutline", "HOutlineSpecificOn"),
    ("HObject", "HObjectSpecificOn"),
    ("HIntersection", "HIntersectionSpecificOn"),
    ("HSmooth", "HSmoothSpecificOn"),
    ("HMaterial", "HMaterialSpecificOn"),
    ("HSelected", "HSelectedSpecificOn"),
    ("HNormalAngle", "HNormalAngleSpecificOn"),
    ("HWireframe", "HWireframeSpecificOn"),
];

/// Reduction slots of a line set and the flag gating each
const REDUCTIONS: [(&str, &str); 4] = [
    ("VSizeReduction", "VSizeReductionOn"),
    ("VAlphaReduction", "VAlphaReductionOn"),
    ("HSizeReduction", "HSizeReductionOn"),
    ("HAlphaReduction", "HAlphaReductionOn"),
];

struct LineWalker<'a> {
    records: &'a Records,
    family: IndexSet<String>,
}

impl LineWalker<'_> {
    /// Add the record a string parameter points at, if it exists
    fn follow(&mut self, from: &str, key: &str) -> Option<String> {
        let id = self.records.get(from)?.param_str(key)?;
        if !self.records.contains_key(id) {
            return None;
        }
        self.family.insert(id.to_string());
        Some(id.to_string())
    }

    fn brush(&mut self, line_set: &str, key: &str) {
        let Some(brush) = self.follow(line_set, key) else {
            return;
        };
        if let Some(detail) = self.follow(&brush, "BrushDetail") {
            self.follow(&detail, "BrushMap");
            self.follow(&detail, "DistortionMap");
        }
        self.follow(&brush, "ColorMap");
        self.follow(&brush, "SizeMap");
    }

    fn line_set(&mut self, id: &str, settings: &ImportSettings) {
        self.brush(id, "VBrushSettings");
        self.brush(id, "HBrushSettings");

        let Some(record) = self.records.get(id) else {
            return;
        };
        let gated = |slots: &[(&'static str, &'static str)], import_disabled: bool| {
            slots
                .iter()
                .filter(|(slot, flag)| {
                    record.params.contains_key(*slot)
                        && record.params.contains_key(*flag)
                        && (import_disabled || record.param_flag(flag))
                })
                .map(|(slot, _)| *slot)
                .collect::<Vec<_>>()
        };
        let brushes = gated(&SPECIFIC_BRUSHES[..], settings.import_disabled_brush_settings);
        let reductions = gated(&REDUCTIONS[..], settings.import_disabled_reduction_settings);

        for slot in brushes {
            self.brush(id, slot);
        }
        for slot in reductions {
            self.follow(id, slot);
        }
    }
}

/// Wire ids of the given `Line` roots and everything they reference,
/// roots first. Missing records and `null` references are ignored.
pub fn collect_line_family(records: &Records, roots: &[String], settings: &ImportSettings) -> IndexSet<String> {
    let mut walker = LineWalker {
        records,
        family: IndexSet::new(),
    };
    for root in roots {
        let Some(line) = records.get(root) else {
            tracing::debug!(id = %root, "Requested line is not in the document");
            continue;
        };
        walker.family.insert(root.clone());

        let line_sets: Vec<String> = line
            .params
            .get("LineSets")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str())
            .filter(|id| records.contains_key(*id))
            .map(str::to_string)
            .collect();
        for line_set in line_sets {
            walker.family.insert(line_set.clone());
            walker.line_set(&line_set, settings);
        }
    }
    walker.family
}

/// The records of `records` whose ids are in `family`, in document order
pub fn select(records: &Records, family: &IndexSet<String>) -> Records {
    records
        .iter()
        .filter(|(id, _)| family.contains(*id))
        .map(|(id, record)| (id.clone(), record.clone()))
        .collect()
}

/// Material records and groups reachable from a set of material roots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFamily {
    /// Pencil materials with their advanced and line functions records
    pub materials: IndexSet<String>,
    /// Referenced position groups
    pub position_groups: IndexSet<String>,
    /// Referenced color groups
    pub color_groups: IndexSet<String>,
}

/// Collect the side records and groups of the given `PencilMaterial` roots
pub fn collect_material_family(document: &Document, roots: &[String]) -> MaterialFamily {
    let mut family = MaterialFamily::default();
    for root in roots {
        let Some(material) = document.materials.get(root) else {
            continue;
        };
        family.materials.insert(root.clone());

        for key in ["AdvancedMaterial", "LineFunctions"] {
            if let Some(id) = material.param_str(key).filter(|id| document.materials.contains_key(*id)) {
                family.materials.insert(id.to_string());
            }
        }
        if let Some(id) = material
            .param_str("PositionGroup")
            .filter(|id| document.position_groups.contains_key(*id))
        {
            family.position_groups.insert(id.to_string());
        }
        if let Some(id) = material
            .param_str("ColorGroup")
            .filter(|id| document.color_groups.contains_key(*id))
        {
            family.color_groups.insert(id.to_string());
        }
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WireNode;
    use serde_json::{json, Value};

    fn record(node_type: &str, params: Value) -> WireNode {
        let mut node = WireNode::new("n", Some(node_type));
        if let Value::Object(params) = params {
            node.params = params;
        }
        node
    }

    fn line_document() -> Records {
        let mut records = Records::new();
        records.insert("T/Line".into(), record("Line", json!({"LineSets": ["T/Set", "T/Gone"]})));
        records.insert(
            "T/Set".into(),
            record(
                "LineSet",
                json!({
                    "VBrushSettings": "T/Brush",
                    "HBrushSettings": null,
                    "VOutline": "T/OutlineBrush",
                    "VOutlineSpecificOn": false,
                    "VObject": "T/ObjectBrush",
                    "VObjectSpecificOn": true,
                    "VSizeReduction": "T/Reduction",
                    "VSizeReductionOn": false,
                    "HWireframe": "T/Orphan"
                }),
            ),
        );
        records.insert(
            "T/Brush".into(),
            record("BrushSettings", json!({"BrushDetail": "T/Detail", "ColorMap": "T/Tex", "SizeMap": null})),
        );
        records.insert(
            "T/Detail".into(),
            record("BrushDetailSettings", json!({"BrushMap": null, "DistortionMap": "T/Tex"})),
        );
        records.insert("T/Tex".into(), record("TextureMap", json!({})));
        records.insert("T/OutlineBrush".into(), record("BrushSettings", json!({})));
        records.insert("T/ObjectBrush".into(), record("BrushSettings", json!({"BrushDetail": null})));
        records.insert("T/Reduction".into(), record("ReductionSettings", json!({})));
        records.insert("T/Orphan".into(), record("BrushSettings", json!({})));
        records.insert("T/Unrelated".into(), record("Line", json!({"LineSets": []})));
        records
    }

    #[test]
    fn test_disabled_branches_follow_settings() {
        let records = line_document();
        let roots = vec!["T/Line".to_string()];

        let strict = ImportSettings {
            import_disabled_brush_settings: false,
            import_disabled_reduction_settings: false,
            ..ImportSettings::default()
        };
        let family = collect_line_family(&records, &roots, &strict);
        assert!(family.contains("T/ObjectBrush"));
        assert!(!family.contains("T/OutlineBrush"));
        assert!(!family.contains("T/Reduction"));

        let family = collect_line_family(&records, &roots, &ImportSettings::default());
        assert!(family.contains("T/OutlineBrush"));
        assert!(family.contains("T/Reduction"));
    }

    #[test]
    fn test_closure_contents() {
        let records = line_document();
        let family = collect_line_family(&records, &["T/Line".to_string()], &ImportSettings::default());
        assert_eq!(family.first().map(String::as_str), Some("T/Line"));
        for id in ["T/Set", "T/Brush", "T/Detail", "T/Tex"] {
            assert!(family.contains(id), "{id}");
        }
        // A slot without its flag is not followed; unrelated roots stay out
        assert!(!family.contains("T/Orphan"));
        assert!(!family.contains("T/Unrelated"));
        assert!(!family.contains("T/Gone"));

        let selected = select(&records, &family);
        let order: Vec<&str> = selected.keys().map(String::as_str).collect();
        assert_eq!(order[..3], ["T/Line", "T/Set", "T/Brush"]);
    }

    #[test]
    fn test_unknown_roots_are_ignored() {
        let records = line_document();
        let family = collect_line_family(&records, &["T/Nope".to_string()], &ImportSettings::default());
        assert!(family.is_empty());
    }

    #[test]
    fn test_material_family() {
        let mut document = Document::new("Host", "1.1", 1.0);
        document.materials.insert(
            "Mat".into(),
            record(
                "PencilMaterial",
                json!({
                    "AdvancedMaterial": "Mat_Advanced",
                    "LineFunctions": "Funcs",
                    "PositionGroup": "Pos",
                    "ColorGroup": "Missing"
                }),
            ),
        );
        document.materials.insert("Mat_Advanced".into(), record("AdvancedMaterial", json!({})));
        document.materials.insert("Funcs".into(), record("LineRelatedFunctions", json!({})));
        document.materials.insert("Other".into(), record("PencilMaterial", json!({})));
        document.position_groups.insert("Pos".into(), WireNode::new("Pos", None));

        let family = collect_material_family(&document, &["Mat".to_string()]);
        let materials: Vec<&str> = family.materials.iter().map(String::as_str).collect();
        assert_eq!(materials, ["Mat", "Mat_Advanced", "Funcs"]);
        assert!(family.position_groups.contains("Pos"));
        assert!(family.color_groups.is_empty());
    }
}
