// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SszData container for runtime value manipulation.

use crate::reflect::SszType;
use crate::types::{SszKind, TypeDescriptor};
use crate::value::SszValue;
use std::fmt;
use std::sync::Arc;

/// Errors for SszData operations.
#[derive(Debug)]
pub enum DataError {
    FieldNotFound(String),
    TypeMismatch { expected: String, got: String },
    InvalidOperation(String),
    IndexOutOfBounds { index: usize, length: usize },
    SequenceTooLong { length: usize, max: u64 },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFound(name) => write!(f, "field not found: {}", name),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {}, got {}", expected, got)
            }
            Self::InvalidOperation(msg) => write!(f, "invalid operation for type: {}", msg),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index out of bounds: {} >= {}", index, length)
            }
            Self::SequenceTooLong { length, max } => {
                write!(f, "list length exceeds maximum: {} > {}", length, max)
            }
        }
    }
}

impl std::error::Error for DataError {}

/// A value paired with the descriptor it conforms to.
#[derive(Debug, Clone)]
pub struct SszData {
    descriptor: Arc<TypeDescriptor>,
    value: SszValue,
}

impl SszData {
    /// Zero value of the descriptor.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value: SszValue::zero(descriptor),
        }
    }

    /// Wrap an existing value after a shallow shape check.
    pub fn from_value(
        descriptor: &Arc<TypeDescriptor>,
        value: SszValue,
    ) -> Result<Self, DataError> {
        check_value(descriptor, &value)?;
        Ok(Self {
            descriptor: descriptor.clone(),
            value,
        })
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor.type_name
    }

    pub fn value(&self) -> &SszValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut SszValue {
        &mut self.value
    }

    pub fn into_value(self) -> SszValue {
        self.value
    }

    /// Typed field value by name.
    pub fn get<T: SszType>(&self, name: &str) -> Result<T, DataError> {
        let value = self.get_field(name)?.clone();
        T::from_ssz_value(value).map_err(|e| DataError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            got: e.to_string(),
        })
    }

    /// Replace a field from a typed value.
    pub fn set<T: SszType>(&mut self, name: &str, value: T) -> Result<(), DataError> {
        self.set_field(name, value.to_ssz_value())
    }

    pub fn get_field(&self, name: &str) -> Result<&SszValue, DataError> {
        let (index, _) = self.field_slot(name)?;
        match &self.value {
            SszValue::Container(fields) => fields
                .get(index)
                .ok_or_else(|| DataError::FieldNotFound(name.to_string())),
            _ => Err(DataError::InvalidOperation(
                "get_field requires a container".into(),
            )),
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Result<&mut SszValue, DataError> {
        let (index, _) = self.field_slot(name)?;
        match &mut self.value {
            SszValue::Container(fields) => fields
                .get_mut(index)
                .ok_or_else(|| DataError::FieldNotFound(name.to_string())),
            _ => Err(DataError::InvalidOperation(
                "get_field_mut requires a container".into(),
            )),
        }
    }

    /// Replace a field, checking the value against the field descriptor.
    pub fn set_field(&mut self, name: &str, value: SszValue) -> Result<(), DataError> {
        let (_, desc) = self.field_slot(name)?;
        check_value(&desc, &value)?;
        *self.get_field_mut(name)? = value;
        Ok(())
    }

    /// Field as a nested `SszData`.
    pub fn field_data(&self, name: &str) -> Result<SszData, DataError> {
        let (_, desc) = self.field_slot(name)?;
        Ok(SszData {
            descriptor: desc,
            value: self.get_field(name)?.clone(),
        })
    }

    /// Element count of a vector or list value.
    pub fn len(&self) -> Result<usize, DataError> {
        match &self.value {
            SszValue::List(items) => Ok(items.len()),
            SszValue::Bytes(bytes) => Ok(bytes.len()),
            _ => Err(DataError::InvalidOperation(
                "len requires a vector or list".into(),
            )),
        }
    }

    pub fn get_element(&self, index: usize) -> Result<&SszValue, DataError> {
        match &self.value {
            SszValue::List(items) => items.get(index).ok_or(DataError::IndexOutOfBounds {
                index,
                length: items.len(),
            }),
            _ => Err(DataError::InvalidOperation(
                "get_element requires a non-byte vector or list".into(),
            )),
        }
    }

    pub fn set_element(&mut self, index: usize, value: SszValue) -> Result<(), DataError> {
        if let Some(elem) = self.descriptor.element_desc() {
            check_value(elem, &value)?;
        }
        match &mut self.value {
            SszValue::List(items) => {
                let length = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or(DataError::IndexOutOfBounds { index, length })?;
                *slot = value;
                Ok(())
            }
            _ => Err(DataError::InvalidOperation(
                "set_element requires a non-byte vector or list".into(),
            )),
        }
    }

    /// Append to a list, honouring its literal limit.
    pub fn push(&mut self, value: SszValue) -> Result<(), DataError> {
        if !matches!(
            self.descriptor.kind,
            SszKind::List | SszKind::ProgressiveList
        ) {
            return Err(DataError::InvalidOperation(format!(
                "push requires a list, got {}",
                self.descriptor.kind
            )));
        }
        if let Some(elem) = self.descriptor.element_desc() {
            check_value(elem, &value)?;
        }
        let limit = self.descriptor.limit;
        let length = self.len()? + 1;
        if let Some(max) = limit.filter(|max| length as u64 > *max) {
            return Err(DataError::SequenceTooLong { length, max });
        }
        match (&mut self.value, value) {
            (SszValue::Bytes(bytes), SszValue::Uint8(b)) => bytes.push(b),
            (SszValue::List(items), value) => items.push(value),
            (_, value) => {
                return Err(DataError::TypeMismatch {
                    expected: "uint8".into(),
                    got: value.kind_name().into(),
                })
            }
        }
        Ok(())
    }

    fn field_slot(&self, name: &str) -> Result<(usize, Arc<TypeDescriptor>), DataError> {
        let container = self.descriptor.container().ok_or_else(|| {
            DataError::InvalidOperation(format!(
                "{} is not a container",
                self.descriptor.type_name
            ))
        })?;
        container
            .field(name)
            .map(|(index, field)| (index, field.desc.clone()))
            .ok_or_else(|| DataError::FieldNotFound(name.to_string()))
    }
}

impl fmt::Display for SszData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.descriptor.type_name, self.value)
    }
}

/// Shallow check that `value` has the variant `desc` expects.
fn check_value(desc: &TypeDescriptor, value: &SszValue) -> Result<(), DataError> {
    let ok = match (desc.kind, value) {
        (SszKind::Bool, SszValue::Bool(_))
        | (SszKind::Uint8, SszValue::Uint8(_))
        | (SszKind::Uint16, SszValue::Uint16(_))
        | (SszKind::Uint32, SszValue::Uint32(_))
        | (SszKind::Uint64, SszValue::Uint64(_))
        | (SszKind::Uint128 | SszKind::Uint256, SszValue::Bytes(_) | SszValue::List(_))
        | (
            SszKind::Bitvector | SszKind::Bitlist | SszKind::ProgressiveBitlist,
            SszValue::Bytes(_),
        )
        | (
            SszKind::Vector | SszKind::List | SszKind::ProgressiveList,
            SszValue::List(_),
        )
        | (
            SszKind::Container | SszKind::ProgressiveContainer,
            SszValue::Container(_),
        )
        | (SszKind::CompatibleUnion, SszValue::Union(..))
        | (SszKind::Custom, _) => true,
        (SszKind::Vector | SszKind::List | SszKind::ProgressiveList, SszValue::Bytes(_)) => {
            desc.is_byte_shaped()
        }
        (SszKind::TypeWrapper, value) => {
            return match desc.element_desc() {
                Some(inner) => check_value(inner, value),
                None => Ok(()),
            }
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(DataError::TypeMismatch {
            expected: desc.kind.to_string(),
            got: value.kind_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DescriptorBuilder;

    fn checkpoint() -> Arc<TypeDescriptor> {
        Arc::new(
            DescriptorBuilder::new("Checkpoint")
                .field("epoch", SszKind::Uint64)
                .bytes_field("root", 32)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_new_is_zero_value() {
        let data = SszData::new(&checkpoint());
        assert_eq!(data.type_name(), "Checkpoint");
        assert_eq!(data.get::<u64>("epoch").unwrap(), 0);
        assert_eq!(data.get::<Vec<u8>>("root").unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_set_and_get() {
        let mut data = SszData::new(&checkpoint());
        data.set("epoch", 12u64).unwrap();
        assert_eq!(data.get::<u64>("epoch").unwrap(), 12);
        assert_eq!(data.get_field("epoch").unwrap(), &SszValue::Uint64(12));

        assert!(matches!(
            data.set("epoch", 1u32),
            Err(DataError::TypeMismatch { .. })
        ));
        assert!(matches!(
            data.get::<u64>("slot"),
            Err(DataError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_from_value_checks_shape() {
        let desc = checkpoint();
        assert!(SszData::from_value(&desc, SszValue::Uint64(1)).is_err());
        let data = SszData::from_value(
            &desc,
            SszValue::Container(vec![SszValue::Uint64(3), SszValue::Bytes(vec![1; 32])]),
        )
        .unwrap();
        assert_eq!(data.get::<u64>("epoch").unwrap(), 3);
    }

    #[test]
    fn test_list_push_respects_limit() {
        let desc = Arc::new(
            TypeDescriptor::list(Arc::new(TypeDescriptor::uint16()), Some(2)).unwrap(),
        );
        let mut data = SszData::new(&desc);
        data.push(SszValue::Uint16(1)).unwrap();
        data.push(SszValue::Uint16(2)).unwrap();
        assert!(matches!(
            data.push(SszValue::Uint16(3)),
            Err(DataError::SequenceTooLong { length: 3, max: 2 })
        ));
        assert!(data.push(SszValue::Uint8(3)).is_err());

        data.set_element(0, SszValue::Uint16(9)).unwrap();
        assert_eq!(data.get_element(0).unwrap(), &SszValue::Uint16(9));
        assert!(matches!(
            data.get_element(5),
            Err(DataError::IndexOutOfBounds { index: 5, length: 2 })
        ));
    }

    #[test]
    fn test_byte_list_push() {
        let mut data = SszData::new(&Arc::new(TypeDescriptor::byte_list(4)));
        data.push(SszValue::Uint8(7)).unwrap();
        assert_eq!(data.value(), &SszValue::Bytes(vec![7]));
        assert_eq!(data.len().unwrap(), 1);
    }

    #[test]
    fn test_nested_field_data() {
        let outer = Arc::new(
            DescriptorBuilder::new("Outer")
                .field("flag", SszKind::Bool)
                .field_with_type("cp", checkpoint())
                .build()
                .unwrap(),
        );
        let mut data = SszData::new(&outer);
        data.set_field(
            "cp",
            SszValue::Container(vec![SszValue::Uint64(5), SszValue::Bytes(vec![0; 32])]),
        )
        .unwrap();
        let cp = data.field_data("cp").unwrap();
        assert_eq!(cp.get::<u64>("epoch").unwrap(), 5);
    }
}
