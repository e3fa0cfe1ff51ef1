/*
This tool is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use crate::utils::ProgressReporter;
use crate::vector::{AttributeField, FeatureLayer, FieldData, ShapeType};
use evalexpr::*;
use std::io::{Error, ErrorKind};

const NULL_NAMES: [&str; 4] = ["null", "NULL", "none", "NONE"];

/// Narrows a layer's selection to the features whose attributes satisfy a
/// boolean expression, e.g. `CHAN_TYPE == "SUPPLY" || CHAN_TYPE == "ESCAPE"`.
/// Every attribute field is bound as a variable, as is `FID` (the record
/// number) unless the table has its own. Null attributes are bound to the
/// string "null". Records for which the expression does not evaluate to a
/// boolean are not selected. Returns the number of selected features.
pub fn select_by_attribute(
    layer: &mut FeatureLayer,
    statement: &str,
    verbose: bool,
) -> Result<usize, Error> {
    let statement = statement.replace('\'', "\"");
    let precompiled = build_operator_tree(&statement).map_err(|e| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Could not parse the statement '{}': {}", statement, e),
        )
    })?;

    let fields = layer.source.attributes.fields.clone();
    let contains_fid = fields.iter().any(|f| f.name.to_lowercase() == "fid");
    for identifier in precompiled.iter_variable_identifiers() {
        let known = fields.iter().any(|f| f.name == identifier)
            || NULL_NAMES.contains(&identifier)
            || (!contains_fid && identifier == "FID");
        if !known {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "The statement refers to '{}', which is not a field of {}.",
                    identifier, layer.name
                ),
            ));
        }
    }

    let total = layer.selection_count();
    let mut progress = ProgressReporter::new("Progress", verbose);
    let attributes = &layer.source.attributes;
    let mut selected = Vec::with_capacity(total);
    for (n, (record_num, record)) in layer.selected_records().enumerate() {
        progress.update(n + 1, total);
        if record.shape_type == ShapeType::Null {
            continue;
        }
        let context = record_context(&fields, attributes.get_record(record_num), record_num, contains_fid)?;
        if precompiled.eval_boolean_with_context(&context).unwrap_or(false) {
            selected.push(record_num);
        }
    }
    layer.set_selection(selected);

    if verbose {
        println!("Number of selected features: {}", layer.selection_count());
    }
    Ok(layer.selection_count())
}

/// Binds one record's attributes as expression variables. A field named like
/// one of the null keywords shadows the keyword.
fn record_context(
    fields: &[AttributeField],
    att_data: &[FieldData],
    record_num: usize,
    contains_fid: bool,
) -> Result<HashMapContext, Error> {
    let mut context = HashMapContext::new();
    let bind_error = |name: &str, e: EvalexprError| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Could not bind attribute {} of record {}: {}", name, record_num, e),
        )
    };
    for (field, value) in fields.iter().zip(att_data.iter()) {
        let name = field.name.clone();
        let bound = match value {
            FieldData::Int(val) => context.set_value(name, (*val as i64).into()),
            FieldData::Real(val) => context.set_value(name, (*val).into()),
            FieldData::Text(val) => context.set_value(name, val.as_str().into()),
            FieldData::Date(val) => context.set_value(name, format!("{}", val).into()),
            FieldData::Bool(val) => context.set_value(name, (*val).into()),
            FieldData::Null => context.set_value(name, "null".into()),
        };
        bound.map_err(|e| bind_error(&field.name, e))?;
    }
    for null_name in NULL_NAMES {
        if !fields.iter().any(|f| f.name == null_name) {
            context
                .set_value(null_name.to_string(), "null".into())
                .map_err(|e| bind_error(null_name, e))?;
        }
    }
    if !contains_fid {
        context
            .set_value("FID".to_string(), (record_num as i64).into())
            .map_err(|e| bind_error("FID", e))?;
    }
    Ok(context)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::Point2D;
    use crate::vector::{Shapefile, ShapefileGeometry};

    fn channels() -> FeatureLayer {
        let mut sf = Shapefile::new("features.shp", ShapeType::PolyLine).unwrap();
        sf.attributes
            .add_field(&AttributeField::new("CHAN_TYPE", 'C', 10, 0));
        sf.attributes.add_field(&AttributeField::new("WIDTH", 'N', 8, 2));
        let rows = [
            (FieldData::Text("SUPPLY".to_string()), FieldData::Real(4.0)),
            (FieldData::Text("DRAIN".to_string()), FieldData::Real(2.5)),
            (FieldData::Text("ESCAPE".to_string()), FieldData::Null),
            (FieldData::Null, FieldData::Real(1.0)),
        ];
        for (i, (chan_type, width)) in rows.iter().enumerate() {
            let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
            sfg.add_part(&[Point2D::new(0.0, i as f64), Point2D::new(10.0, i as f64)]);
            sf.add_record(sfg);
            sf.attributes
                .add_record(vec![chan_type.clone(), width.clone()], false);
        }
        FeatureLayer::new("features", sf)
    }

    #[test]
    fn test_supply_or_escape() {
        let mut layer = channels();
        let n = select_by_attribute(
            &mut layer,
            "CHAN_TYPE == \"SUPPLY\" || CHAN_TYPE == \"ESCAPE\"",
            false,
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(layer.selection(), &[0, 2]);
    }

    #[test]
    fn test_numeric_predicate_skips_nulls() {
        let mut layer = channels();
        select_by_attribute(&mut layer, "WIDTH > 2.0", false).unwrap();
        assert_eq!(layer.selection(), &[0, 1]);
    }

    #[test]
    fn test_single_quotes_and_fid() {
        let mut layer = channels();
        select_by_attribute(&mut layer, "CHAN_TYPE == 'DRAIN' || FID == 3", false).unwrap();
        assert_eq!(layer.selection(), &[1, 3]);
    }

    #[test]
    fn test_bad_statements() {
        let mut layer = channels();
        assert!(select_by_attribute(&mut layer, "CHAN_TYPE == ", false).is_err());
        let err = select_by_attribute(&mut layer, "TYPE == \"SUPPLY\"", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        // the failed calls leave the selection untouched
        assert_eq!(layer.selection_count(), 4);
    }

    #[test]
    fn test_conflicting_bindings_are_errors() {
        let mut sf = Shapefile::new("features.shp", ShapeType::PolyLine).unwrap();
        // truncated dBASE names can collide
        sf.attributes.add_field(&AttributeField::new("CHAN_TYPE", 'C', 10, 0));
        sf.attributes.add_field(&AttributeField::new("CHAN_TYPE", 'N', 8, 2));
        let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
        sfg.add_part(&[Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)]);
        sf.add_record(sfg);
        sf.attributes.add_record(
            vec![FieldData::Text("SUPPLY".to_string()), FieldData::Real(1.0)],
            false,
        );
        let mut layer = FeatureLayer::new("features", sf);
        let err = select_by_attribute(&mut layer, "CHAN_TYPE == \"SUPPLY\"", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("CHAN_TYPE"));
        assert_eq!(layer.selection_count(), 1);
    }

    #[test]
    fn test_field_shadows_null_keyword() {
        let mut sf = Shapefile::new("features.shp", ShapeType::PolyLine).unwrap();
        sf.attributes.add_field(&AttributeField::new("NONE", 'N', 8, 0));
        for i in 0..2 {
            let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
            sfg.add_part(&[Point2D::new(0.0, i as f64), Point2D::new(10.0, i as f64)]);
            sf.add_record(sfg);
            sf.attributes.add_record(vec![FieldData::Int(i)], false);
        }
        let mut layer = FeatureLayer::new("features", sf);
        select_by_attribute(&mut layer, "NONE == 1", false).unwrap();
        assert_eq!(layer.selection(), &[1]);
    }
}
