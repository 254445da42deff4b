use serde_json::{Map, Value};

/// Keys that may carry the generated image URL, in priority order
const URL_KEYS: [&str; 2] = ["image", "url"];

/// Shape of a succeeded task's `output`
///
/// The backend returns either a list of results or a single result object;
/// anything else is treated as carrying no image.
#[derive(Debug, PartialEq)]
pub enum TaskOutput<'a> {
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
    Empty,
}

impl<'a> TaskOutput<'a> {
    pub fn classify(output: Option<&'a Value>) -> Self {
        match output {
            Some(Value::Array(items)) if !items.is_empty() => Self::Sequence(items),
            Some(Value::Object(map)) if !map.is_empty() => Self::Mapping(map),
            _ => Self::Empty,
        }
    }

    /// The generated image URL, if the output carries one
    pub fn image_url(&self) -> Option<&'a str> {
        match *self {
            Self::Sequence(items) => items.first().and_then(Value::as_object).and_then(url_field),
            Self::Mapping(map) => url_field(map),
            Self::Empty => None,
        }
    }
}

fn url_field(map: &Map<String, Value>) -> Option<&str> {
    URL_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str).filter(|url| !url.is_empty()))
}

/// Extract the generated image URL from a task's raw output
pub fn image_url(output: Option<&Value>) -> Option<String> {
    TaskOutput::classify(output).image_url().map(str::to_string)
}
