//! Map-viewer configuration payload.
//!
//! The clustering engine has no opinion on how results get rendered; this
//! module only hands back a config blob shaped for a Kepler-style map
//! viewer, keyed on the columns a debug or production run actually
//! produced. The value is freeform JSON - downstream viewers are on their
//! own stack.

use serde_json::{json, Value};

/// Build a map-viewer config pointing at `lat_col`/`lon_col` for position
/// and, when present, a `color_col` to drive point coloring.
pub fn kepler_config(lat_col: &str, lon_col: &str, color_col: Option<&str>) -> Value {
    let mut layer_config = json!({
        "dataId": "anonymized",
        "label": "anonymized points",
        "columns": {
            "lat": lat_col,
            "lng": lon_col,
        },
        "isVisible": true,
        "visConfig": {
            "radius": 10,
            "opacity": 0.8,
            "outline": false,
        },
    });

    if let Some(color_col) = color_col {
        layer_config["visualChannels"] = json!({
            "colorField": {
                "name": color_col,
                "type": "string",
            },
            "colorScale": "ordinal",
        });
    }

    json!({
        "version": "v1",
        "config": {
            "visState": {
                "layers": [
                    {
                        "type": "point",
                        "config": layer_config,
                    }
                ],
                "interactionConfig": {
                    "tooltip": {
                        "fieldsToShow": {
                            "anonymized": [lat_col, lon_col],
                        },
                        "enabled": true,
                    },
                },
            },
            "mapState": {
                "zoom": 10,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_carries_column_names() {
        let cfg = kepler_config("lat", "lon", None);
        assert_eq!(
            cfg["config"]["visState"]["layers"][0]["config"]["columns"]["lat"],
            "lat"
        );
    }

    #[test]
    fn color_column_adds_visual_channel() {
        let cfg = kepler_config("lat", "lon", Some("id"));
        assert_eq!(
            cfg["config"]["visState"]["layers"][0]["config"]["visualChannels"]["colorField"]
                ["name"],
            "id"
        );
    }
}
