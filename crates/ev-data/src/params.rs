use ev_core::EventError;
use serde_json::Value;

/// Typed view over one command's parameter list.
pub(crate) struct Params<'a> {
    code: i64,
    values: &'a [Value],
}

impl<'a> Params<'a> {
    pub(crate) fn new(code: i64, values: &'a [Value]) -> Self {
        Self { code, values }
    }

    pub(crate) fn raw(&self) -> &'a [Value] {
        self.values
    }

    fn get(&self, index: usize) -> Result<&'a Value, EventError> {
        self.values.get(index).ok_or_else(|| {
            EventError::new(
                "DATA_PARAM",
                format!(
                    "Command {} is missing parameter {} (got {}).",
                    self.code,
                    index,
                    self.values.len()
                ),
            )
        })
    }

    fn mismatch(&self, index: usize, expected: &str, value: &Value) -> EventError {
        EventError::new(
            "DATA_PARAM",
            format!(
                "Command {} parameter {} should be {}, got {}.",
                self.code, index, expected, value
            ),
        )
    }

    pub(crate) fn int(&self, index: usize) -> Result<i64, EventError> {
        let value = self.get(index)?;
        match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|float| float as i64))
                .ok_or_else(|| self.mismatch(index, "an integer", value)),
            Value::Bool(flag) => Ok(i64::from(*flag)),
            _ => Err(self.mismatch(index, "an integer", value)),
        }
    }

    pub(crate) fn int_or(&self, index: usize, fallback: i64) -> Result<i64, EventError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(fallback),
            Some(_) => self.int(index),
        }
    }

    pub(crate) fn int32(&self, index: usize) -> Result<i32, EventError> {
        let value = self.int(index)?;
        i32::try_from(value).map_err(|_| {
            EventError::new(
                "DATA_PARAM",
                format!(
                    "Command {} parameter {} is out of range, got {}.",
                    self.code, index, value
                ),
            )
        })
    }

    pub(crate) fn int32_or(&self, index: usize, fallback: i32) -> Result<i32, EventError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(fallback),
            Some(_) => self.int32(index),
        }
    }

    pub(crate) fn uint(&self, index: usize) -> Result<u32, EventError> {
        let value = self.int(index)?;
        u32::try_from(value).map_err(|_| {
            EventError::new(
                "DATA_PARAM",
                format!(
                    "Command {} parameter {} should be non-negative, got {}.",
                    self.code, index, value
                ),
            )
        })
    }

    pub(crate) fn uint_or(&self, index: usize, fallback: u32) -> Result<u32, EventError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(fallback),
            Some(_) => self.uint(index),
        }
    }

    /// Accepts JSON booleans as well as the numeric flags older data files use.
    pub(crate) fn flag(&self, index: usize) -> Result<bool, EventError> {
        let value = self.get(index)?;
        match value {
            Value::Bool(flag) => Ok(*flag),
            Value::Number(_) => Ok(self.int(index)? != 0),
            _ => Err(self.mismatch(index, "a boolean", value)),
        }
    }

    pub(crate) fn flag_or(&self, index: usize, fallback: bool) -> Result<bool, EventError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(fallback),
            Some(_) => self.flag(index),
        }
    }

    /// Switch-style value where 0 means ON.
    pub(crate) fn on_off(&self, index: usize) -> Result<bool, EventError> {
        Ok(self.int(index)? == 0)
    }

    pub(crate) fn string(&self, index: usize) -> Result<String, EventError> {
        let value = self.get(index)?;
        match value {
            Value::String(text) => Ok(text.clone()),
            _ => Err(self.mismatch(index, "a string", value)),
        }
    }

    pub(crate) fn string_or_empty(&self, index: usize) -> Result<String, EventError> {
        match self.values.get(index) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(_) => self.string(index),
        }
    }

    pub(crate) fn array(&self, index: usize) -> Result<&'a [Value], EventError> {
        let value = self.get(index)?;
        match value {
            Value::Array(items) => Ok(items.as_slice()),
            _ => Err(self.mismatch(index, "an array", value)),
        }
    }

    pub(crate) fn object(&self, index: usize) -> Result<&'a serde_json::Map<String, Value>, EventError> {
        let value = self.get(index)?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(self.mismatch(index, "an object", value)),
        }
    }

    pub(crate) fn int_quad(&self, index: usize) -> Result<[i32; 4], EventError> {
        let items = self.array(index)?;
        let mut quad = [0; 4];
        for (slot, item) in quad.iter_mut().zip(items.iter()) {
            *slot = item
                .as_i64()
                .or_else(|| item.as_f64().map(|float| float as i64))
                .and_then(|number| i32::try_from(number).ok())
                .ok_or_else(|| self.mismatch(index, "an array of integers", item))?;
        }
        Ok(quad)
    }
}
