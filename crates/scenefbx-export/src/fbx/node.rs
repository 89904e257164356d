//! FBX record building
//!
//! Documents are laid out as an fbxcel record [`Tree`] before encoding.
//! [`RecordTree`] appends records to it; [`Properties70`] collects the `P`
//! entries of a property block.

use fbxcel::low::v7400::AttributeValue;
use fbxcel::tree::v7400::{NodeId, Tree};

/// String attribute
pub fn string(value: impl Into<String>) -> AttributeValue {
    AttributeValue::String(value.into())
}

/// Appending records to an FBX record tree
pub trait RecordTree {
    /// Append a record named `name` carrying `attributes` under `parent`
    fn record(&mut self, parent: NodeId, name: &str, attributes: Vec<AttributeValue>) -> NodeId;

    /// Record with a single attribute
    fn leaf(&mut self, parent: NodeId, name: &str, value: impl Into<AttributeValue>) -> NodeId {
        self.record(parent, name, vec![value.into()])
    }

    /// Record without attributes, holding only children
    fn group(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.record(parent, name, Vec::new())
    }
}

impl RecordTree for Tree {
    fn record(&mut self, parent: NodeId, name: &str, attributes: Vec<AttributeValue>) -> NodeId {
        let id = self.append_new(parent, name);
        if !attributes.is_empty() {
            self.set_attributes_vec(id, attributes);
        }
        id
    }
}

/// Builder for a `Properties70` block of `P` records.
///
/// Each entry is `P: name, type, label, flags, values...`.
#[derive(Debug, Default)]
pub struct Properties70 {
    entries: Vec<Vec<AttributeValue>>,
}

impl Properties70 {
    /// Empty property block
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(
        mut self,
        name: &str,
        kind: &str,
        label: &str,
        flags: &str,
        values: impl IntoIterator<Item = AttributeValue>,
    ) -> Self {
        let mut p = vec![string(name), string(kind), string(label), string(flags)];
        p.extend(values);
        self.entries.push(p);
        self
    }

    /// `int` entry
    pub fn int(self, name: &str, value: i32) -> Self {
        self.entry(name, "int", "Integer", "", [AttributeValue::I32(value)])
    }

    /// `enum` entry such as a light or texture type
    pub fn enumeration(self, name: &str, value: i32) -> Self {
        self.entry(name, "enum", "", "", [AttributeValue::I32(value)])
    }

    /// `bool` entry, stored as an integer
    pub fn boolean(self, name: &str, value: bool) -> Self {
        self.entry(name, "bool", "", "", [AttributeValue::I32(i32::from(value))])
    }

    /// `double` entry
    pub fn double(self, name: &str, value: f64) -> Self {
        self.entry(name, "double", "Number", "", [AttributeValue::F64(value)])
    }

    /// Animatable scalar such as a material factor or light intensity
    pub fn number(self, name: &str, value: f64) -> Self {
        self.entry(name, "Number", "", "A", [AttributeValue::F64(value)])
    }

    /// Animatable color
    pub fn color(self, name: &str, rgb: [f64; 3]) -> Self {
        self.entry(name, "Color", "", "A", rgb.map(AttributeValue::F64))
    }

    /// Static color
    pub fn color_rgb(self, name: &str, rgb: [f64; 3]) -> Self {
        self.entry(name, "ColorRGB", "Color", "", rgb.map(AttributeValue::F64))
    }

    /// Animatable vector of type `kind`, e.g. `Lcl Translation`
    pub fn vector(self, name: &str, kind: &str, value: [f64; 3]) -> Self {
        self.entry(name, kind, "", "A", value.map(AttributeValue::F64))
    }

    /// `KString` entry
    pub fn string(self, name: &str, value: &str) -> Self {
        self.entry(name, "KString", "", "", [string(value)])
    }

    /// `KTime` entry in FBX ticks
    pub fn time(self, name: &str, value: i64) -> Self {
        self.entry(name, "KTime", "Time", "", [AttributeValue::I64(value)])
    }

    /// Append the block under `parent`
    pub fn append_to(self, tree: &mut Tree, parent: NodeId) -> NodeId {
        let block = tree.group(parent, "Properties70");
        for p in self.entries {
            tree.record(block, "P", p);
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties70() {
        let mut tree = Tree::default();
        let root = tree.root().node_id();
        let model = tree.group(root, "Model");
        Properties70::new()
            .vector("Lcl Translation", "Lcl Translation", [1.0, 2.0, 3.0])
            .number("DiffuseFactor", 1.0)
            .boolean("CastShadows", true)
            .append_to(&mut tree, model);

        let block = tree
            .root()
            .first_child_by_name("Model")
            .and_then(|m| m.first_child_by_name("Properties70"))
            .unwrap();
        let entries: Vec<_> = block.children_by_name("P").collect();
        assert_eq!(entries.len(), 3);

        let p = entries[0].attributes();
        assert_eq!(p[0].get_string(), Some("Lcl Translation"));
        assert_eq!(p[3].get_string(), Some("A"));
        assert_eq!(p[6].get_f64(), Some(3.0));
        assert_eq!(entries[2].attributes()[4].get_i32(), Some(1));
    }

    #[test]
    fn test_records() {
        let mut tree = Tree::default();
        let root = tree.root().node_id();
        let header = tree.group(root, "Header");
        tree.leaf(header, "Version", 1003);
        tree.record(header, "Pair", vec![string("a"), 7i64.into()]);

        let header = tree.root().first_child_by_name("Header").unwrap();
        assert!(header.attributes().is_empty());
        assert_eq!(
            header
                .first_child_by_name("Version")
                .and_then(|v| v.attributes()[0].get_i32()),
            Some(1003)
        );
        let pair = header.first_child_by_name("Pair").unwrap();
        assert_eq!(pair.attributes()[1].get_i64(), Some(7));
        assert!(header.first_child_by_name("Missing").is_none());
    }
}
