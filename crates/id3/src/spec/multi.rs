//! The repetition combinator.

use crate::context::{ContextKey, FrameContext};
use crate::error::SpecError;
use crate::spec::{DowngradeOptions, FieldSpec};
use crate::value::FieldValue;

/// Repeats a sequence of sub-specs until the payload runs out.
///
/// With one sub-spec the decoded value is a flat [`FieldValue::List`];
/// with several, a list of [`FieldValue::Record`] rows, one sub-value
/// per spec. The optional separator splits a single assigned string
/// into list elements on validation, and joins elements back together
/// on downgrade when the caller asks for it.
pub struct MultiSpec {
    name: String,
    specs: Vec<Box<dyn FieldSpec>>,
    sep: Option<String>,
    reads: Vec<ContextKey>,
}

impl MultiSpec {
    /// `specs` must not be empty.
    pub fn new(name: impl Into<String>, specs: Vec<Box<dyn FieldSpec>>) -> Self {
        Self::build(name.into(), specs, None)
    }

    /// A multi spec whose values can be assigned as one `sep`-delimited
    /// string.
    pub fn with_sep(
        name: impl Into<String>,
        specs: Vec<Box<dyn FieldSpec>>,
        sep: impl Into<String>,
    ) -> Self {
        Self::build(name.into(), specs, Some(sep.into()))
    }

    fn build(name: String, specs: Vec<Box<dyn FieldSpec>>, sep: Option<String>) -> Self {
        debug_assert!(!specs.is_empty());
        let mut reads = Vec::new();
        for spec in &specs {
            for key in spec.reads() {
                if !reads.contains(key) {
                    reads.push(*key);
                }
            }
        }
        MultiSpec { name, specs, sep, reads }
    }

    pub fn specs(&self) -> &[Box<dyn FieldSpec>] {
        &self.specs
    }
}

impl FieldSpec for MultiSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn read<'a>(
        &self,
        ctx: &FrameContext,
        data: &'a [u8],
    ) -> Result<(FieldValue, &'a [u8]), SpecError> {
        let mut values = Vec::new();
        let mut rest = data;
        while !rest.is_empty() {
            let before = rest.len();
            let mut record = Vec::with_capacity(self.specs.len());
            for spec in &self.specs {
                let (value, next) = spec.read(ctx, rest)?;
                record.push(value);
                rest = next;
            }
            if rest.len() >= before {
                // A zero-width iteration would repeat forever.
                return Err(SpecError::MalformedFrame("multi-value field makes no progress"));
            }
            if self.specs.len() == 1 {
                if let Some(value) = record.pop() {
                    values.push(value);
                }
            } else {
                values.push(FieldValue::Record(record));
            }
        }
        Ok((FieldValue::List(values), rest))
    }

    fn write(&self, ctx: &FrameContext, value: &FieldValue) -> Result<Vec<u8>, SpecError> {
        let items = match value {
            FieldValue::List(items) => items,
            _ => return Err(SpecError::Format("multi-value field requires a list")),
        };
        let mut out = Vec::new();
        if self.specs.len() == 1 {
            for item in items {
                out.extend(self.specs[0].write(ctx, item)?);
            }
        } else {
            for item in items {
                match item {
                    FieldValue::Record(parts) => {
                        for (part, spec) in parts.iter().zip(&self.specs) {
                            out.extend(spec.write(ctx, part)?);
                        }
                    }
                    _ => return Err(SpecError::Format("multi-value field requires records")),
                }
            }
        }
        Ok(out)
    }

    fn validate(&self, ctx: &FrameContext, value: FieldValue) -> Result<FieldValue, SpecError> {
        let items = match value {
            FieldValue::None => return Ok(FieldValue::List(Vec::new())),
            FieldValue::Text(s) => match &self.sep {
                Some(sep) => s
                    .split(sep.as_str())
                    .map(|part| FieldValue::Text(part.to_owned()))
                    .collect(),
                None => return Err(SpecError::Format("multi-value field requires a list")),
            },
            FieldValue::List(items) => items,
            _ => return Err(SpecError::Format("multi-value field requires a list")),
        };
        let validated = if self.specs.len() == 1 {
            items
                .into_iter()
                .map(|item| self.specs[0].validate(ctx, item))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            items
                .into_iter()
                .map(|item| match item {
                    FieldValue::Record(parts) => parts
                        .into_iter()
                        .zip(&self.specs)
                        .map(|(part, spec)| spec.validate(ctx, part))
                        .collect::<Result<Vec<_>, _>>()
                        .map(FieldValue::Record),
                    _ => Err(SpecError::Format("multi-value field requires records")),
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(FieldValue::List(validated))
    }

    fn downgrade(
        &self,
        ctx: &FrameContext,
        value: FieldValue,
        opts: &DowngradeOptions,
    ) -> Result<FieldValue, SpecError> {
        let items = match value {
            FieldValue::List(items) => items,
            other => return Ok(other),
        };
        if self.specs.len() != 1 {
            let rows = items
                .into_iter()
                .map(|item| match item {
                    FieldValue::Record(parts) => parts
                        .into_iter()
                        .zip(&self.specs)
                        .map(|(part, spec)| spec.downgrade(ctx, part, opts))
                        .collect::<Result<Vec<_>, _>>()
                        .map(FieldValue::Record),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(FieldValue::List(rows));
        }
        let spec = &self.specs[0];
        if !spec.merges_on_downgrade() {
            return Ok(FieldValue::List(items));
        }
        let items = items
            .into_iter()
            .map(|item| spec.downgrade(ctx, item, opts))
            .collect::<Result<Vec<_>, _>>()?;
        let sep = match &opts.sep {
            Some(sep) if items.len() > 1 => sep,
            _ => return Ok(FieldValue::List(items)),
        };
        let mut parts = Vec::with_capacity(items.len());
        for item in &items {
            match item.as_text() {
                Some(s) => parts.push(s),
                None => return Err(SpecError::Format("cannot join non-text values")),
            }
        }
        let merged = spec.validate(ctx, FieldValue::Text(parts.join(sep)))?;
        Ok(FieldValue::List(vec![merged]))
    }

    fn reads(&self) -> &[ContextKey] {
        &self.reads
    }
}
