//! JSON descriptions of layout options, algorithms and categories.

use crate::adapter::{add_string, add_value, new_object, JsonObject};
use elk_meta::{LayoutAlgorithmData, LayoutCategoryData, LayoutMetaDataProvider, LayoutOptionData};
use serde_json::Value;

/// One piece of layout metadata.
#[derive(Clone, Copy, Debug)]
pub enum LayoutMetaData<'a> {
    Option(&'a LayoutOptionData),
    Algorithm(&'a LayoutAlgorithmData),
    Category(&'a LayoutCategoryData),
}

impl<'a> From<&'a LayoutOptionData> for LayoutMetaData<'a> {
    fn from(data: &'a LayoutOptionData) -> Self {
        LayoutMetaData::Option(data)
    }
}

impl<'a> From<&'a LayoutAlgorithmData> for LayoutMetaData<'a> {
    fn from(data: &'a LayoutAlgorithmData) -> Self {
        LayoutMetaData::Algorithm(data)
    }
}

impl<'a> From<&'a LayoutCategoryData> for LayoutMetaData<'a> {
    fn from(data: &'a LayoutCategoryData) -> Self {
        LayoutMetaData::Category(data)
    }
}

pub fn to_json<'a>(data: impl Into<LayoutMetaData<'a>>) -> JsonObject {
    match data.into() {
        LayoutMetaData::Option(option) => option_to_json(option),
        LayoutMetaData::Algorithm(algorithm) => algorithm_to_json(algorithm),
        LayoutMetaData::Category(category) => category_to_json(category),
    }
}

fn common(id: &str, name: Option<&str>, description: Option<&str>) -> JsonObject {
    let mut obj = new_object();
    add_string(&mut obj, "id", id);
    if let Some(name) = name {
        add_string(&mut obj, "name", name);
    }
    if let Some(description) = description {
        add_string(&mut obj, "description", description);
    }
    obj
}

fn strings<T: ToString>(items: &[T]) -> Value {
    Value::Array(items.iter().map(|i| Value::String(i.to_string())).collect())
}

fn option_to_json(option: &LayoutOptionData) -> JsonObject {
    let mut obj = common(&option.id, option.name.as_deref(), option.description.as_deref());
    if let Some(group) = &option.group {
        add_string(&mut obj, "group", group);
    }
    add_string(&mut obj, "type", &option.option_type.to_string());
    if !option.targets.is_empty() {
        add_value(&mut obj, "targets", strings(&option.targets));
    }
    obj
}

fn algorithm_to_json(algorithm: &LayoutAlgorithmData) -> JsonObject {
    let mut obj = common(
        &algorithm.id,
        algorithm.name.as_deref(),
        algorithm.description.as_deref(),
    );
    if let Some(category) = &algorithm.category_id {
        add_string(&mut obj, "category", category);
    }
    if !algorithm.known_option_ids.is_empty() {
        add_value(&mut obj, "knownOptions", strings(&algorithm.known_option_ids));
    }
    if !algorithm.supported_features.is_empty() {
        add_value(&mut obj, "supportedFeatures", strings(&algorithm.supported_features));
    }
    obj
}

fn category_to_json(category: &LayoutCategoryData) -> JsonObject {
    let mut obj = common(&category.id, category.name.as_deref(), category.description.as_deref());
    if !category.layouters.is_empty() {
        add_value(&mut obj, "knownLayouters", strings(&category.layouters));
    }
    obj
}

/// Everything `provider` knows, as `{"options": [..], "algorithms": [..], "categories": [..]}`.
pub fn all_to_json(provider: &dyn LayoutMetaDataProvider) -> Value {
    let mut obj = new_object();
    let options = provider.options().into_iter().map(|o| Value::Object(to_json(o)));
    add_value(&mut obj, "options", Value::Array(options.collect()));
    let algorithms = provider.algorithms().into_iter().map(|a| Value::Object(to_json(a)));
    add_value(&mut obj, "algorithms", Value::Array(algorithms.collect()));
    let categories = provider.categories().into_iter().map(|c| Value::Object(to_json(c)));
    add_value(&mut obj, "categories", Value::Array(categories.collect()));
    Value::Object(obj)
}
