//! Document layout
//!
//! Converts a [`Scene`] into the top-level FBX 7.4 records: header
//! extension, global settings, definitions, objects, connections and takes.
//! Every object gets a unique 64-bit id; the root node is id 0.

use chrono::{Datelike, NaiveDateTime, Timelike};
use scenefbx_core::Vec3;

use fbxcel::low::v7400::AttributeValue;
use fbxcel::tree::v7400::{NodeId as RecordId, Tree};

use super::node::{string, Properties70, RecordTree};
use super::scene::{
    FileTexture, Geometry, LightAttribute, MaterialLayer, Node, NodeAttribute, NodeId,
    PhongMaterial, ReferenceMode, Scene,
};
use super::writer::FBX_VERSION;

/// Fixed file id paired with [`CREATION_TIME`]
const FILE_ID: [u8; 16] = [
    0x28, 0xb3, 0x2a, 0xeb, 0xb6, 0x24, 0xcc, 0xc2, 0xbf, 0xc8, 0xb0, 0x2a, 0xa9, 0x2b, 0xfc, 0xf1,
];

const CREATION_TIME: &str = "1970-01-01 10:00:00:000";

/// First id handed out to objects
const FIRST_UID: i64 = 1_000_000;

/// FBX ticks for one second of animation time
const TICKS_PER_SECOND: i64 = 46_186_158_000;

/// `name\0\x01Class`, the object naming scheme of binary FBX
fn object_name(name: &str, class: &str) -> String {
    format!("{}\x00\x01{}", name, class)
}

fn vec3(v: Vec3) -> [f64; 3] {
    v.to_f64()
}

/// Ids assigned to every object of a scene
struct Uids {
    nodes: Vec<i64>,
    geometries: Vec<i64>,
    lights: Vec<i64>,
    materials: Vec<i64>,
    textures: Vec<i64>,
    videos: Vec<Option<i64>>,
}

impl Uids {
    fn assign(scene: &Scene) -> Self {
        let mut next = FIRST_UID;
        let mut take = || {
            let id = next;
            next += 1;
            id
        };

        let nodes = scene
            .nodes()
            .map(|(id, _)| if id == scene.root() { 0 } else { take() })
            .collect();
        let geometries = scene.geometries().map(|_| take()).collect();
        let lights = scene.lights().map(|_| take()).collect();
        let materials = scene.materials().map(|_| take()).collect();
        let textures = scene.textures().map(|_| take()).collect();
        let videos = scene
            .textures()
            .map(|(_, t)| t.content.as_ref().map(|_| take()))
            .collect();

        Self {
            nodes,
            geometries,
            lights,
            materials,
            textures,
            videos,
        }
    }
}

/// Lay out `scene` as an FBX record tree. `created` stamps the header.
pub fn layout(scene: &Scene, created: NaiveDateTime) -> Tree {
    let uids = Uids::assign(scene);
    let creator = format!("SceneFBX {}", env!("CARGO_PKG_VERSION"));

    let mut tree = Tree::default();
    let root = tree.root().node_id();

    header_extension(&mut tree, root, &creator, created);
    tree.leaf(root, "FileId", FILE_ID.to_vec());
    tree.leaf(root, "CreationTime", string(CREATION_TIME));
    tree.leaf(root, "Creator", string(creator));
    global_settings(&mut tree, root);
    documents(&mut tree, root, scene);
    tree.group(root, "References");
    definitions(&mut tree, root, scene, &uids);
    objects(&mut tree, root, scene, &uids);
    connections(&mut tree, root, scene, &uids);
    let takes = tree.group(root, "Takes");
    tree.leaf(takes, "Current", string(""));

    tree
}

fn header_extension(tree: &mut Tree, parent: RecordId, creator: &str, created: NaiveDateTime) {
    let header = tree.group(parent, "FBXHeaderExtension");
    tree.leaf(header, "FBXHeaderVersion", 1003);
    tree.leaf(header, "FBXVersion", FBX_VERSION as i32);
    tree.leaf(header, "EncryptionType", 0);

    let stamp = tree.group(header, "CreationTimeStamp");
    tree.leaf(stamp, "Version", 1000);
    tree.leaf(stamp, "Year", created.year());
    tree.leaf(stamp, "Month", created.month() as i32);
    tree.leaf(stamp, "Day", created.day() as i32);
    tree.leaf(stamp, "Hour", created.hour() as i32);
    tree.leaf(stamp, "Minute", created.minute() as i32);
    tree.leaf(stamp, "Second", created.second() as i32);
    tree.leaf(stamp, "Millisecond", (created.nanosecond() / 1_000_000) as i32);

    tree.leaf(header, "Creator", string(creator));
}

fn global_settings(tree: &mut Tree, parent: RecordId) {
    let settings = tree.group(parent, "GlobalSettings");
    tree.leaf(settings, "Version", 1000);
    Properties70::new()
        .int("UpAxis", 1)
        .int("UpAxisSign", 1)
        .int("FrontAxis", 2)
        .int("FrontAxisSign", 1)
        .int("CoordAxis", 0)
        .int("CoordAxisSign", 1)
        .int("OriginalUpAxis", -1)
        .int("OriginalUpAxisSign", 1)
        .double("UnitScaleFactor", 1.0)
        .double("OriginalUnitScaleFactor", 1.0)
        .color_rgb("AmbientColor", [0.0; 3])
        .string("DefaultCamera", "Producer Perspective")
        .enumeration("TimeMode", 11)
        .time("TimeSpanStart", 0)
        .time("TimeSpanStop", TICKS_PER_SECOND)
        .double("CustomFrameRate", -1.0)
        .append_to(tree, settings);
}

fn documents(tree: &mut Tree, parent: RecordId, scene: &Scene) {
    let documents = tree.group(parent, "Documents");
    tree.leaf(documents, "Count", 1);

    let document = tree.record(
        documents,
        "Document",
        vec![(FIRST_UID - 1).into(), string(scene.name.as_str()), string("Scene")],
    );
    Properties70::new()
        .string("ActiveAnimStackName", "")
        .append_to(tree, document);
    tree.leaf(document, "RootNode", 0i64);
}

fn definitions(tree: &mut Tree, parent: RecordId, scene: &Scene, uids: &Uids) {
    let video_count = uids.videos.iter().flatten().count();
    let counts = [
        ("GlobalSettings", 1),
        ("Model", scene.node_count()),
        ("Geometry", scene.geometry_count()),
        ("NodeAttribute", scene.light_count()),
        ("Material", scene.material_count()),
        ("Texture", scene.texture_count()),
        ("Video", video_count),
    ];
    let total: usize = counts.iter().map(|(_, n)| n).sum();

    let definitions = tree.group(parent, "Definitions");
    tree.leaf(definitions, "Version", 100);
    tree.leaf(definitions, "Count", total as i32);

    for (kind, count) in counts.into_iter().filter(|(_, n)| *n > 0) {
        let object_type = tree.leaf(definitions, "ObjectType", string(kind));
        tree.leaf(object_type, "Count", count as i32);
    }
}

fn objects(tree: &mut Tree, parent: RecordId, scene: &Scene, uids: &Uids) {
    let objects = tree.group(parent, "Objects");

    for (id, light) in scene.lights() {
        light_attribute(tree, objects, uids.lights[id.index()], light);
    }
    for (id, geometry) in scene.geometries() {
        geometry_object(tree, objects, uids.geometries[id.index()], geometry);
    }
    for (id, node) in scene.nodes().filter(|(id, _)| *id != scene.root()) {
        model(tree, objects, uids.nodes[id.index()], node);
    }
    for (id, material) in scene.materials() {
        material_object(tree, objects, uids.materials[id.index()], material);
    }
    for (id, texture) in scene.textures() {
        if let (Some(uid), Some(content)) = (uids.videos[id.index()], &texture.content) {
            video(tree, objects, uid, texture, content);
        }
        texture_object(tree, objects, uids.textures[id.index()], texture);
    }
}

/// Object record: `uid, name\0\x01Class, subclass`
fn object(tree: &mut Tree, parent: RecordId, kind: &str, uid: i64, name: &str, subclass: &str) -> RecordId {
    tree.record(
        parent,
        kind,
        vec![uid.into(), string(object_name(name, kind)), string(subclass)],
    )
}

fn light_attribute(tree: &mut Tree, parent: RecordId, uid: i64, light: &LightAttribute) {
    let node = object(tree, parent, "NodeAttribute", uid, &light.name, "Light");
    Properties70::new()
        .enumeration("LightType", light.kind.code())
        .color("Color", light.color)
        .number("Intensity", light.intensity)
        .boolean("CastShadows", light.cast_shadows)
        .color("ShadowColor", light.shadow_color)
        .append_to(tree, node);
    tree.leaf(node, "TypeFlags", string("Light"));
    tree.leaf(node, "GeometryVersion", 124);
}

fn geometry_object(tree: &mut Tree, parent: RecordId, uid: i64, geometry: &Geometry) {
    let vertices: Vec<f64> = geometry
        .control_points
        .iter()
        .flat_map(|p| vec3(*p))
        .collect();

    // The last index of each polygon is stored as -(index + 1)
    let polygon_vertex_index: Vec<i32> = geometry
        .polygons
        .iter()
        .flat_map(|polygon| {
            let last = polygon.len().saturating_sub(1);
            polygon
                .iter()
                .enumerate()
                .map(move |(i, &v)| if i == last { !(v as i32) } else { v as i32 })
        })
        .collect();

    let node = object(tree, parent, "Geometry", uid, &geometry.name, "Mesh");
    Properties70::new().append_to(tree, node);
    tree.leaf(node, "GeometryVersion", 124);
    tree.leaf(node, "Vertices", vertices);
    tree.leaf(node, "PolygonVertexIndex", polygon_vertex_index);

    let mut layered = Vec::new();
    if let Some(normals) = &geometry.normals {
        let data = normals.direct.iter().flat_map(|n| vec3(*n)).collect();
        let element = LayerData {
            kind: "LayerElementNormal",
            version: 102,
            name: &normals.name,
            mapping: normals.mapping.as_str(),
            reference: normals.reference,
        };
        element.append_to(tree, node, ("Normals", data), ("NormalsIndex", &normals.index));
        layered.push(element.kind);
    }
    if let Some(colors) = &geometry.colors {
        let data = colors.direct.iter().flat_map(|c| c.to_rgba_f64()).collect();
        let element = LayerData {
            kind: "LayerElementColor",
            version: 101,
            name: &colors.name,
            mapping: colors.mapping.as_str(),
            reference: colors.reference,
        };
        element.append_to(tree, node, ("Colors", data), ("ColorIndex", &colors.index));
        layered.push(element.kind);
    }
    if let Some(uvs) = &geometry.uvs {
        let data = uvs
            .direct
            .iter()
            .flat_map(|uv| [f64::from(uv.x), f64::from(uv.y)])
            .collect();
        let element = LayerData {
            kind: "LayerElementUV",
            version: 101,
            name: &uvs.name,
            mapping: uvs.mapping.as_str(),
            reference: uvs.reference,
        };
        element.append_to(tree, node, ("UV", data), ("UVIndex", &uvs.index));
        layered.push(element.kind);
    }
    if let Some(materials) = &geometry.materials {
        material_layer(tree, node, materials);
        layered.push("LayerElementMaterial");
    }

    let layer = tree.leaf(node, "Layer", 0);
    tree.leaf(layer, "Version", 100);
    for kind in layered {
        let element = tree.group(layer, "LayerElement");
        tree.leaf(element, "Type", string(kind));
        tree.leaf(element, "TypedIndex", 0);
    }
}

/// Header fields of a geometry layer element
struct LayerData<'a> {
    kind: &'static str,
    version: i32,
    name: &'a str,
    mapping: &'a str,
    reference: ReferenceMode,
}

impl LayerData<'_> {
    fn append_to(
        &self,
        tree: &mut Tree,
        parent: RecordId,
        (data_name, data): (&str, Vec<f64>),
        (index_name, index): (&str, &[i32]),
    ) {
        let node = tree.leaf(parent, self.kind, 0);
        tree.leaf(node, "Version", self.version);
        tree.leaf(node, "Name", string(self.name));
        tree.leaf(node, "MappingInformationType", string(self.mapping));
        tree.leaf(node, "ReferenceInformationType", string(self.reference.as_str()));
        tree.leaf(node, data_name, data);
        if self.reference == ReferenceMode::IndexToDirect {
            tree.leaf(node, index_name, index);
        }
    }
}

fn material_layer(tree: &mut Tree, parent: RecordId, layer: &MaterialLayer) {
    let node = tree.leaf(parent, "LayerElementMaterial", 0);
    tree.leaf(node, "Version", 101);
    tree.leaf(node, "Name", string(layer.name.as_str()));
    tree.leaf(node, "MappingInformationType", string(layer.mapping.as_str()));
    tree.leaf(node, "ReferenceInformationType", string(layer.reference.as_str()));
    tree.leaf(node, "Materials", layer.indices.as_slice());
}

fn model(tree: &mut Tree, parent: RecordId, uid: i64, node: &Node) {
    let class = match node.attribute {
        Some(NodeAttribute::Mesh(_)) => "Mesh",
        Some(NodeAttribute::Light(_)) => "Light",
        None => "Null",
    };

    let record = object(tree, parent, "Model", uid, &node.name, class);
    tree.leaf(record, "Version", 232);

    let t = &node.transform;
    Properties70::new()
        .vector("Lcl Translation", "Lcl Translation", vec3(t.translation))
        .vector("Lcl Rotation", "Lcl Rotation", vec3(t.rotation))
        .vector("Lcl Scaling", "Lcl Scaling", vec3(t.scale))
        .int("DefaultAttributeIndex", if node.attribute.is_some() { 0 } else { -1 })
        .enumeration("InheritType", 1)
        .append_to(tree, record);

    tree.leaf(record, "MultiLayer", 0);
    tree.leaf(record, "MultiTake", 0);
    tree.leaf(record, "Shading", node.texture_shading);
    tree.leaf(record, "Culling", string("CullingOff"));
}

fn material_object(tree: &mut Tree, parent: RecordId, uid: i64, material: &PhongMaterial) {
    let node = object(tree, parent, "Material", uid, &material.name, "");
    tree.leaf(node, "Version", 102);
    tree.leaf(node, "ShadingModel", string("phong"));
    tree.leaf(node, "MultiLayer", 0);
    Properties70::new()
        .color("EmissiveColor", material.emissive)
        .color("AmbientColor", material.ambient)
        .number("AmbientFactor", material.ambient_factor)
        .color("DiffuseColor", material.diffuse)
        .number("DiffuseFactor", material.diffuse_factor)
        .number("SpecularFactor", material.specular_factor)
        .number("TransparencyFactor", material.transparency_factor)
        .color("TransparentColor", material.transparent_color)
        .append_to(tree, node);
}

fn file_name(texture: &FileTexture) -> String {
    texture.file_name.to_string_lossy().into_owned()
}

fn relative_file_name(texture: &FileTexture) -> String {
    texture
        .file_name
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn video(tree: &mut Tree, parent: RecordId, uid: i64, texture: &FileTexture, content: &[u8]) {
    let node = object(tree, parent, "Video", uid, &texture.name, "Clip");
    tree.leaf(node, "Type", string("Clip"));
    Properties70::new()
        .string("Path", &file_name(texture))
        .append_to(tree, node);
    tree.leaf(node, "UseMipMap", 0);
    tree.leaf(node, "Filename", string(file_name(texture)));
    tree.leaf(node, "RelativeFilename", string(relative_file_name(texture)));
    tree.leaf(node, "Content", content);
}

fn texture_object(tree: &mut Tree, parent: RecordId, uid: i64, texture: &FileTexture) {
    let [tu, tv] = texture.translation;
    let [su, sv] = texture.scale;
    let [ru, rv] = texture.rotation;

    let node = object(tree, parent, "Texture", uid, &texture.name, "");
    tree.leaf(node, "Type", string("TextureVideoClip"));
    tree.leaf(node, "Version", 202);
    tree.leaf(node, "TextureName", string(object_name(&texture.name, "Texture")));
    Properties70::new()
        .enumeration("CurrentMappingType", 0)
        .enumeration("TextureTypeUse", texture.usage.code())
        .boolean("UseMaterial", true)
        .boolean("SwapUV", texture.swap_uv)
        .string("UVSet", &texture.uv_set)
        .vector("Translation", "Vector", [tu, tv, 0.0])
        .vector("Rotation", "Vector", [ru, rv, 0.0])
        .vector("Scaling", "Vector", [su, sv, 1.0])
        .append_to(tree, node);
    tree.leaf(node, "Media", string(object_name(&texture.name, "Video")));
    tree.leaf(node, "FileName", string(file_name(texture)));
    tree.leaf(node, "RelativeFilename", string(relative_file_name(texture)));
    tree.record(node, "ModelUVTranslation", vec![tu.into(), tv.into()]);
    tree.record(node, "ModelUVScaling", vec![su.into(), sv.into()]);
    tree.leaf(node, "Texture_Alpha_Source", string("None"));
    tree.record(node, "Cropping", vec![AttributeValue::I32(0); 4]);
}

fn connect(tree: &mut Tree, parent: RecordId, kind: &str, child: i64, target: i64) {
    tree.record(parent, "C", vec![string(kind), child.into(), target.into()]);
}

fn connections(tree: &mut Tree, parent: RecordId, scene: &Scene, uids: &Uids) {
    let connections = tree.group(parent, "Connections");
    let node_uid = |id: NodeId| uids.nodes[id.index()];

    for (id, node) in scene.nodes().filter(|(id, _)| *id != scene.root()) {
        let uid = node_uid(id);
        if let Some(parent_node) = node.parent() {
            connect(tree, connections, "OO", uid, node_uid(parent_node));
        }
        match node.attribute {
            Some(NodeAttribute::Mesh(g)) => {
                connect(tree, connections, "OO", uids.geometries[g.index()], uid);
            }
            Some(NodeAttribute::Light(l)) => {
                connect(tree, connections, "OO", uids.lights[l.index()], uid);
            }
            None => {}
        }
        for material in &node.materials {
            connect(tree, connections, "OO", uids.materials[material.index()], uid);
        }
    }

    for (id, material) in scene.materials() {
        let material_uid = uids.materials[id.index()];
        for (channel, texture) in &material.textures {
            tree.record(
                connections,
                "C",
                vec![
                    string("OP"),
                    uids.textures[texture.index()].into(),
                    material_uid.into(),
                    string(channel.as_str()),
                ],
            );
        }
    }

    for (id, _) in scene.textures() {
        if let Some(video_uid) = uids.videos[id.index()] {
            connect(tree, connections, "OO", video_uid, uids.textures[id.index()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fbx::scene::{LayerElement, LightKind, MappingMode, MaterialChannel, TextureUsage};
    use crate::transform::Transform;
    use chrono::NaiveDate;
    use fbxcel::tree::v7400::NodeHandle;
    use scenefbx_core::Vec2;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|d| d.and_hms_milli_opt(12, 30, 45, 250))
            .unwrap()
    }

    fn find<'a>(tree: &'a Tree, name: &str) -> NodeHandle<'a> {
        tree.root().first_child_by_name(name).unwrap()
    }

    /// First attribute of child record `name`
    fn value<'a>(node: NodeHandle<'a>, name: &str) -> &'a AttributeValue {
        &node.first_child_by_name(name).unwrap().attributes()[0]
    }

    fn triangle_scene() -> Scene {
        let mut scene = Scene::new("Scene");
        let mut geometry = Geometry::new("Tri");
        geometry.control_points = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        geometry.polygons = vec![vec![0, 1, 2]];
        geometry.uvs = Some(LayerElement::by_control_point(
            "UVs",
            vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        ));
        geometry.materials = Some(MaterialLayer {
            name: "Mat".to_string(),
            mapping: MappingMode::AllSame,
            reference: ReferenceMode::IndexToDirect,
            indices: vec![0],
        });
        let geometry = scene.add_geometry(geometry);

        let node = scene.create_node("Tri", Transform::IDENTITY);
        scene.node_mut(node).attribute = Some(NodeAttribute::Mesh(geometry));
        let root = scene.root();
        scene.attach(node, root);

        let mut texture = FileTexture::new("MainTex", "/tmp/staging/wood.png", TextureUsage::Standard);
        texture.content = Some(vec![0x89, b'P', b'N', b'G']);
        let texture = scene.add_texture(texture);

        let mut material = PhongMaterial::new("Mat");
        material.textures.push((MaterialChannel::DiffuseColor, texture));
        let material = scene.add_material(material);
        scene.node_mut(node).materials.push(material);

        let light = scene.add_light(LightAttribute {
            name: "Sun".to_string(),
            kind: LightKind::Directional,
            color: [1.0; 3],
            intensity: 3.0,
            cast_shadows: true,
            shadow_color: [0.0; 3],
        });
        let sun = scene.create_node("Sun", Transform::IDENTITY);
        scene.node_mut(sun).attribute = Some(NodeAttribute::Light(light));
        scene.attach(sun, node);
        scene
    }

    #[test]
    fn test_top_level_sections() {
        let tree = layout(&Scene::new("Empty"), created());
        let names: Vec<_> = tree.root().children().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "FBXHeaderExtension",
                "FileId",
                "CreationTime",
                "Creator",
                "GlobalSettings",
                "Documents",
                "References",
                "Definitions",
                "Objects",
                "Connections",
                "Takes",
            ]
        );

        let stamp = find(&tree, "FBXHeaderExtension")
            .first_child_by_name("CreationTimeStamp")
            .unwrap();
        assert_eq!(value(stamp, "Year").get_i32(), Some(2024));
        assert_eq!(value(stamp, "Millisecond").get_i32(), Some(250));
    }

    #[test]
    fn test_polygon_vertex_index_encoding() {
        let tree = layout(&triangle_scene(), created());
        let geometry = find(&tree, "Objects").first_child_by_name("Geometry").unwrap();
        assert_eq!(
            value(geometry, "PolygonVertexIndex").get_arr_i32(),
            Some(&[0, 1, -3][..])
        );
        assert_eq!(
            value(geometry, "Vertices").get_arr_f64(),
            Some(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0][..])
        );

        let layer = geometry.first_child_by_name("Layer").unwrap();
        let kinds: Vec<_> = layer
            .children_by_name("LayerElement")
            .filter_map(|e| value(e, "Type").get_string())
            .collect();
        assert_eq!(kinds, vec!["LayerElementUV", "LayerElementMaterial"]);

        let material = geometry.first_child_by_name("LayerElementMaterial").unwrap();
        assert_eq!(value(material, "MappingInformationType").get_string(), Some("AllSame"));
    }

    #[test]
    fn test_object_names_and_classes() {
        let tree = layout(&triangle_scene(), created());
        let objects = find(&tree, "Objects");
        let models: Vec<_> = objects.children_by_name("Model").collect();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].attributes()[1].get_string(), Some("Tri\x00\x01Model"));
        assert_eq!(models[0].attributes()[2].get_string(), Some("Mesh"));
        assert_eq!(models[1].attributes()[2].get_string(), Some("Light"));

        let video = objects.first_child_by_name("Video").unwrap();
        assert_eq!(value(video, "Content").get_binary(), Some(&b"\x89PNG"[..]));
    }

    #[test]
    fn test_connections() {
        let tree = layout(&triangle_scene(), created());
        let connections: Vec<_> = find(&tree, "Connections").children_by_name("C").collect();

        // Root children connect to id 0
        let to_root = connections
            .iter()
            .filter(|c| c.attributes()[2].get_i64() == Some(0))
            .count();
        assert_eq!(to_root, 1);

        let op: Vec<_> = connections
            .iter()
            .filter(|c| c.attributes()[0].get_string() == Some("OP"))
            .collect();
        assert_eq!(op.len(), 1);
        assert_eq!(op[0].attributes()[3].get_string(), Some("DiffuseColor"));

        let definitions = find(&tree, "Definitions");
        assert_eq!(value(definitions, "Count").get_i32(), Some(8));
    }
}
