use ngff_inspector::ome_ngff::ValidationSettings;
use ngff_inspector::ome_zarr::{walk, ArrayMetadata, GroupHandle, MemoryArray, MemoryGroup};
use ngff_inspector::{read_plate, validate_hierarchy, PhysicalResolution, PixelIndex, ReadError, ReaderSettings};
use serde_json::{json, Value};

fn level(shape: [u64; 4]) -> MemoryArray {
    let metadata = ArrayMetadata::from_json_str(
        &json!({
            "zarr_format": 2,
            "shape": shape,
            "chunks": [1, 1, 256, 256],
            "dtype": "<u2",
            "compressor": {"id": "blosc", "cname": "lz4", "clevel": 5, "shuffle": 1, "blocksize": 0},
            "fill_value": 0,
            "order": "C",
            "dimension_separator": "/"
        })
        .to_string(),
    )
    .unwrap();
    MemoryArray::new(json!({})).with_metadata(metadata)
}

fn field_of_view() -> MemoryGroup {
    MemoryGroup::new(json!({
        "multiscales": [{
            "version": "0.4",
            "name": "field",
            "axes": [
                {"name": "c", "type": "channel"},
                {"name": "z", "type": "space", "unit": "micrometer"},
                {"name": "y", "type": "space", "unit": "micrometer"},
                {"name": "x", "type": "space", "unit": "micrometer"}
            ],
            "datasets": [
                {"path": "0", "coordinateTransformations": [{"type": "scale", "scale": [1.0, 1.0, 0.1625, 0.1625]}]},
                {"path": "1", "coordinateTransformations": [{"type": "scale", "scale": [1.0, 1.0, 0.325, 0.325]}]}
            ]
        }],
        "omero": {
            "version": "0.4",
            "channels": [{"color": "00FFFF", "label": "DAPI", "window": {"min": 0, "max": 65535, "start": 110, "end": 800}}],
            "rdefs": {"defaultZ": 0, "model": "color"}
        }
    }))
    .with_array("0", level([1, 1, 2160, 2560]))
    .with_array("1", level([1, 1, 1080, 1280]))
}

fn well(images: Value) -> MemoryGroup {
    MemoryGroup::new(json!({"well": {"version": "0.4", "images": images}}))
        .with_group("0", field_of_view())
        .with_group("1", field_of_view())
}

fn plate() -> MemoryGroup {
    MemoryGroup::new(json!({
        "plate": {
            "name": "screen",
            "version": "0.4",
            "acquisitions": [{"id": 0}, {"id": 1}],
            "columns": [{"name": "03"}, {"name": "04"}],
            "rows": [{"name": "B"}],
            "wells": [
                {"path": "B/03", "rowIndex": 0, "columnIndex": 0},
                {"path": "B/04", "rowIndex": 0, "columnIndex": 1}
            ]
        }
    }))
    .with_group(
        "B",
        MemoryGroup::default()
            .with_group("03", well(json!([{"path": "0", "acquisition": 0}, {"path": "1", "acquisition": 1}])))
            .with_group("04", well(json!([{"path": "0", "acquisition": 0}, {"path": "1", "acquisition": 1}]))),
    )
}

#[test]
fn read_plate_end_to_end() {
    let description = read_plate(&plate(), &ReaderSettings::default()).unwrap();
    assert_eq!(description.plate.name.as_deref(), Some("screen"));
    assert_eq!(description.wells.len(), 2);

    let image = description.image("B/04", "1").unwrap();
    assert_eq!(image.image.omero.as_ref().map(|o| o.channels[0].hex_color()), Some("#00FFFF".to_string()));

    let level = image.level(1).unwrap();
    assert_eq!(level.axis_size("y"), Some(1080));
    assert_eq!(level.chunk_count("x"), 5);
    assert_eq!(level.chunk_count("t"), 0);

    let resolution = PhysicalResolution::from([("space".to_string(), 1.0)]);
    assert_eq!(
        image.pixel_index(1, &resolution, 32.6, 65.1).unwrap(),
        PixelIndex { x: 100, y: 200 }
    );
}

#[test]
fn missing_well_group_is_reported() {
    let group = MemoryGroup::new(Value::Object(plate().attributes()));
    let error = read_plate(&group, &ReaderSettings::default()).unwrap_err();
    assert!(matches!(error, ReadError::Structure(_)));
}

#[test]
fn whole_hierarchy_lists_every_ngff_node() {
    let root = walk(&plate()).unwrap();
    let settings = ReaderSettings {
        validation: ValidationSettings {
            enforce_axes_layout: true,
            ..Default::default()
        },
        parallel: true,
    };
    let nodes = validate_hierarchy(&root, &settings).unwrap();
    let paths: Vec<&str> = nodes.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, vec!["", "B/03", "B/03/0", "B/03/1", "B/04", "B/04/0", "B/04/1"]);
}
