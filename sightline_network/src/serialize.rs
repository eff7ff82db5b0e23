// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selective JSON serialization of properties, owners and whole networks.
//!
//! Property records only carry fields that differ from their defaults unless
//! the property's [`SerializationMode`] is `All`; properties in mode `None`
//! are left out of their owner's record. Deserialization is tolerant: missing
//! fields keep their current value, and malformed ones are reported as
//! [`DeserializeIssue`]s instead of aborting the load.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::attributes::{AttributeChange, SerializationMode};
use crate::error::NetworkError;
use crate::id::{OwnerId, ProcessorId, PropertyId};
use crate::network::Network;
use crate::owner::Child;
use crate::port::PortRef;

/// Record type of groups.
pub const COMPOSITE_CLASS_IDENTIFIER: &str = "org.sightline.CompositeProperty";

/// A part of a serialized record that could not be applied.
///
/// Loading continues past every issue; the affected field keeps its previous
/// value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeserializeIssue {
    /// An attribute field has the wrong shape.
    #[error("field `{field}`: {message}")]
    Field {
        /// Field name.
        field: &'static str,
        /// Parser message.
        message: String,
    },
    /// A record that should be a JSON object is not.
    #[error("expected a JSON object")]
    NotAnObject,
    /// A property value could not be parsed.
    #[error("value of `{property}`: {message}")]
    Value {
        /// Property path.
        property: String,
        /// Parser message.
        message: String,
    },
    /// The record describes a different kind of property.
    #[error("`{property}` is a {expected}, the record holds a {found}")]
    TypeMismatch {
        /// Property path.
        property: String,
        /// Class identifier of the live property.
        expected: &'static str,
        /// `type` field of the record.
        found: String,
    },
    /// A renamed property would clash with a sibling.
    #[error("cannot rename `{property}` to `{identifier}`: identifier taken")]
    IdentifierTaken {
        /// Property path.
        property: String,
        /// Requested identifier.
        identifier: String,
    },
    /// The record names a child the owner does not have.
    #[error("`{owner}` has no child `{identifier}`")]
    UnknownProperty {
        /// Owner path.
        owner: String,
        /// Identifier in the record.
        identifier: String,
    },
    /// The record names a processor the network does not have.
    #[error("unknown processor `{0}`")]
    UnknownProcessor(String),
    /// A connection record could not be restored.
    #[error("connection: {0}")]
    Connection(String),
    /// A link record could not be restored.
    #[error("link: {0}")]
    Link(String),
}

fn record_identifier(record: &Value) -> Option<&str> {
    record.get("identifier")?.as_str()
}

impl Network {
    /// Serializes one property.
    ///
    /// # Errors
    ///
    /// Fails on a stale handle or a value that does not serialize.
    pub fn serialize_property(&self, id: impl Into<PropertyId>) -> Result<Value, NetworkError> {
        let id = id.into();
        let data = self.property(id).ok_or(NetworkError::StaleProperty(id))?;
        let mode = data.serialization_mode;
        let mut record = Map::new();
        record.insert("type".to_owned(), data.class_identifier.into());
        record.insert("identifier".to_owned(), data.identifier.clone().into());
        data.display_name.write(&mut record, mode)?;
        data.semantics.write(&mut record, mode)?;
        data.usage_mode.write(&mut record, mode)?;
        data.visible.write(&mut record, mode)?;
        data.read_only.write(&mut record, mode)?;
        if mode == SerializationMode::All || !data.value.value_eq(&data.default_value) {
            record.insert("value".to_owned(), data.value.to_json()?);
        }
        if !data.metadata.is_empty() {
            record.insert("metaData".to_owned(), Value::Object(data.metadata.clone()));
        }
        Ok(Value::Object(record))
    }

    /// Applies a property record.
    ///
    /// Every attribute observer is notified for identifier, display name,
    /// semantics, usage mode, visibility and read-only state, whether or not
    /// the record changed them. A changed value runs
    /// [`property_modified`](Self::property_modified).
    pub fn deserialize_property(
        &mut self,
        id: impl Into<PropertyId>,
        record: &Value,
    ) -> Vec<DeserializeIssue> {
        let id = id.into();
        let mut issues = Vec::new();
        let Some(record) = record.as_object() else {
            issues.push(DeserializeIssue::NotAnObject);
            return issues;
        };
        let Some(data) = self.property(id) else {
            log::warn!("deserialize_property: stale property handle {id:?}");
            return issues;
        };
        let path = self.path(id).join(".");

        if let Some(found) = record.get("type")
            && found.as_str() != Some(data.class_identifier)
        {
            issues.push(DeserializeIssue::TypeMismatch {
                property: path,
                expected: data.class_identifier,
                found: found.as_str().map_or_else(|| found.to_string(), str::to_owned),
            });
            return issues;
        }

        if let Some(identifier) = record.get("identifier").and_then(Value::as_str)
            && identifier != data.identifier
        {
            let taken = data.owner.is_some_and(|owner| {
                self.identifier_taken(owner, identifier, Some(Child::Property(id)))
            });
            if taken {
                issues.push(DeserializeIssue::IdentifierTaken {
                    property: path.clone(),
                    identifier: identifier.to_owned(),
                });
            } else if let Some(data) = self.property_mut(id) {
                data.identifier = identifier.to_owned();
            }
        }

        let Some(data) = self.property_mut(id) else {
            return issues;
        };
        data.display_name.read(record, &mut issues);
        data.semantics.read(record, &mut issues);
        data.usage_mode.read(record, &mut issues);
        data.visible.read(record, &mut issues);
        data.read_only.read(record, &mut issues);
        match record.get("metaData") {
            Some(Value::Object(metadata)) => data.metadata = metadata.clone(),
            Some(_) => issues.push(DeserializeIssue::Field {
                field: "metaData",
                message: "expected an object".to_owned(),
            }),
            None => {}
        }

        let mut value_changed = false;
        if let Some(json) = record.get("value") {
            match data.value.parse_like(json) {
                Ok(mut value) => {
                    if let Some(coerce) = &data.coerce {
                        coerce(&mut value);
                    }
                    if !data.value.value_eq(&value) {
                        data.value = value;
                        value_changed = true;
                    }
                }
                Err(err) => issues.push(DeserializeIssue::Value {
                    property: path,
                    message: err.to_string(),
                }),
            }
        }

        let changes = [
            AttributeChange::Identifier(data.identifier.clone()),
            AttributeChange::DisplayName(data.display_name.value().clone()),
            AttributeChange::Semantics(data.semantics.value().clone()),
            AttributeChange::UsageMode(*data.usage_mode.value()),
            AttributeChange::Visible(*data.visible.value()),
            AttributeChange::ReadOnly(*data.read_only.value()),
        ];
        for change in &changes {
            self.notify_attribute(id, change);
        }
        if value_changed {
            self.property_modified(id);
        }
        for issue in &issues {
            log::warn!("deserializing `{}`: {issue}", self.path(id).join("."));
        }
        issues
    }

    /// Serializes an owner and its children in child order.
    ///
    /// # Errors
    ///
    /// Fails on a stale handle or a value that does not serialize.
    pub fn serialize_owner(&self, owner: impl Into<OwnerId>) -> Result<Value, NetworkError> {
        let owner = owner.into();
        let data = self.owner_data(owner).ok_or(NetworkError::StaleOwner(owner))?;
        let class = data
            .processor
            .as_ref()
            .map_or(COMPOSITE_CLASS_IDENTIFIER, |p| p.info.class_identifier.as_str());
        let mut record = Map::new();
        record.insert("type".to_owned(), class.into());
        record.insert("identifier".to_owned(), data.identifier.clone().into());
        data.display_name
            .write(&mut record, SerializationMode::Default)?;

        let mut children = Vec::with_capacity(data.children.len());
        for child in &data.children {
            match *child {
                Child::Property(p) => {
                    if self.serialization_mode(p) != Some(SerializationMode::None) {
                        children.push(self.serialize_property(p)?);
                    }
                }
                Child::Owner(o) => children.push(self.serialize_owner(o)?),
            }
        }
        record.insert("properties".to_owned(), Value::Array(children));
        Ok(Value::Object(record))
    }

    /// Applies an owner record, matching children by identifier.
    pub fn deserialize_owner(
        &mut self,
        owner: impl Into<OwnerId>,
        record: &Value,
    ) -> Vec<DeserializeIssue> {
        let owner = owner.into();
        let mut issues = Vec::new();
        let Some(object) = record.as_object() else {
            issues.push(DeserializeIssue::NotAnObject);
            return issues;
        };
        if let Some(data) = self.owner_data_mut(owner) {
            data.display_name.read(object, &mut issues);
        }
        let Some(children) = object.get("properties").and_then(Value::as_array) else {
            return issues;
        };
        for child in children {
            let Some(identifier) = record_identifier(child) else {
                issues.push(DeserializeIssue::Field {
                    field: "identifier",
                    message: "missing in child record".to_owned(),
                });
                continue;
            };
            let found = self
                .children(owner)
                .iter()
                .copied()
                .find(|c| match c {
                    Child::Property(p) => self.identifier(*p) == Some(identifier),
                    Child::Owner(o) => self.owner_identifier(*o) == Some(identifier),
                });
            match found {
                Some(Child::Property(p)) => issues.extend(self.deserialize_property(p, child)),
                Some(Child::Owner(o)) => issues.extend(self.deserialize_owner(o, child)),
                None => issues.push(DeserializeIssue::UnknownProperty {
                    owner: self.owner_path(owner).join("."),
                    identifier: identifier.to_owned(),
                }),
            }
        }
        issues
    }

    /// Serializes the whole network: processors, connections and links.
    ///
    /// # Errors
    ///
    /// Fails on a value that does not serialize.
    pub fn serialize(&self) -> Result<Value, NetworkError> {
        let processors = self
            .processors
            .iter()
            .map(|p| self.serialize_owner(*p))
            .collect::<Result<Vec<_>, _>>()?;
        let connections = self
            .connections
            .iter()
            .filter_map(|c| {
                let out = self.port_record(c.outport, true)?;
                let inp = self.port_record(c.inport, false)?;
                Some(serde_json::json!({ "outport": out, "inport": inp }))
            })
            .collect::<Vec<_>>();
        let links = self
            .links
            .iter()
            .map(|l| {
                serde_json::json!({
                    "source": self.path(l.source),
                    "destination": self.path(l.destination),
                })
            })
            .collect::<Vec<_>>();
        Ok(serde_json::json!({
            "processors": processors,
            "connections": connections,
            "links": links,
        }))
    }

    fn port_record(&self, port: PortRef, outport: bool) -> Option<Value> {
        let processor = self.owner_identifier(port.processor)?;
        let identifier = if outport {
            self.outport_identifier(port)?
        } else {
            self.inport_identifier(port)?
        };
        Some(serde_json::json!([processor, identifier]))
    }

    fn resolve_port(&self, record: Option<&Value>, outport: bool) -> Result<PortRef, String> {
        let pair = record
            .and_then(Value::as_array)
            .filter(|a| a.len() == 2)
            .ok_or_else(|| "expected a [processor, port] pair".to_owned())?;
        let (Some(processor), Some(port)) = (pair[0].as_str(), pair[1].as_str()) else {
            return Err("port names must be strings".to_owned());
        };
        let id = self
            .find_processor(processor)
            .ok_or_else(|| format!("unknown processor `{processor}`"))?;
        let found = if outport {
            self.find_outport(id, port)
        } else {
            self.find_inport(id, port)
        };
        found.ok_or_else(|| format!("`{processor}` has no port `{port}`"))
    }

    /// Restores a network record onto the processors already in the network.
    ///
    /// Processors are matched by identifier; their property state is loaded
    /// and missing connections and links are re-created. Everything happens
    /// under one network lock, including each behavior's
    /// [`deserialized`](crate::Process::deserialized) hook, so no processor is
    /// evaluated before its hook has run.
    pub fn deserialize(&mut self, record: &Value) -> Vec<DeserializeIssue> {
        let Some(object) = record.as_object() else {
            return vec![DeserializeIssue::NotAnObject];
        };
        let issues = self.batch(|net| {
            let mut issues = Vec::new();
            for processor in object
                .get("processors")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let identifier = record_identifier(processor).unwrap_or_default();
                match net.find_processor(identifier) {
                    Some(p) => issues.extend(net.deserialize_owner(p, processor)),
                    None => issues.push(DeserializeIssue::UnknownProcessor(identifier.to_owned())),
                }
            }
            for connection in object
                .get("connections")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let ports = net
                    .resolve_port(connection.get("outport"), true)
                    .and_then(|out| Ok((out, net.resolve_port(connection.get("inport"), false)?)));
                let result = ports.and_then(|(out, inp)| {
                    if net.connections.iter().any(|c| c.outport == out && c.inport == inp) {
                        return Ok(());
                    }
                    net.connect_ports(out, inp).map_err(|e| e.to_string())
                });
                if let Err(message) = result {
                    issues.push(DeserializeIssue::Connection(message));
                }
            }
            for link in object
                .get("links")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let resolve = |field: &str| -> Result<PropertyId, String> {
                    let path: Vec<String> = link
                        .get(field)
                        .cloned()
                        .and_then(|v| serde_json::from_value(v).ok())
                        .ok_or_else(|| format!("`{field}` must be a path array"))?;
                    net.find_property(&path[..])
                        .ok_or_else(|| format!("no property at `{}`", path.join(".")))
                };
                let result = resolve("source").and_then(|s| Ok((s, resolve("destination")?)));
                let result = result.and_then(|(s, d)| net.add_link(s, d).map_err(|e| e.to_string()));
                if let Err(message) = result {
                    issues.push(DeserializeIssue::Link(message));
                }
            }
            let processors = net.processors.clone();
            for processor in processors {
                net.run_deserialized_hook(processor);
            }
            issues
        });
        issues
    }

    fn run_deserialized_hook(&mut self, processor: ProcessorId) {
        let behavior = self
            .processor_state_mut(processor)
            .and_then(|s| s.behavior.take());
        if let Some(mut behavior) = behavior {
            behavior.deserialized(self, processor);
            if let Some(state) = self.processor_state_mut(processor) {
                state.behavior = Some(behavior);
            }
        }
    }

    /// Pretty-printed JSON of [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Fails on a value that does not serialize.
    pub fn to_json_string(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string_pretty(&self.serialize()?)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        Network, ProcessorInfo, PropertyBuilder, PropertySemantics, SerializationMode,
    };

    use super::DeserializeIssue;

    #[test]
    fn default_record_is_minimal() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        assert_eq!(
            net.serialize_property(x).unwrap(),
            json!({ "type": "org.sightline.IntProperty", "identifier": "x" })
        );
    }

    #[test]
    fn record_field_order() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        net.set(x, 2);
        net.set_read_only(x, true);
        net.set_display_name(x, "Ex");
        net.set_metadata(x, "color", json!("red"));
        let record = net.serialize_property(x).unwrap();
        let keys: Vec<&str> = record
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            ["type", "identifier", "displayName", "readonly", "value", "metaData"]
        );
    }

    #[test]
    fn mode_all_writes_everything() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        let x = net.add_property(
            p,
            PropertyBuilder::new("x", "X", false).serialization_mode(SerializationMode::All),
        );
        assert_eq!(
            net.serialize_property(x).unwrap(),
            json!({
                "type": "org.sightline.BoolProperty",
                "identifier": "x",
                "displayName": "X",
                "semantics": "Default",
                "usageMode": "Application",
                "visible": true,
                "readonly": false,
                "value": false,
            })
        );
    }

    #[test]
    fn mode_none_is_skipped_by_owner() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        net.add_property(
            p,
            PropertyBuilder::new("hidden", "Hidden", 0_i32)
                .serialization_mode(SerializationMode::None),
        );
        net.add_property(p, PropertyBuilder::new("shown", "Shown", 0_i32));
        let record = net.serialize_owner(p).unwrap();
        let children = record["properties"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0]["identifier"], "shown");
    }

    #[test]
    fn tolerant_deserialize_keeps_prior_values() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        let issues = net.deserialize_property(
            x,
            &json!({
                "type": "org.sightline.IntProperty",
                "identifier": "x",
                "visible": "sometimes",
                "semantics": "Text",
                "value": "three",
            }),
        );
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], DeserializeIssue::Field { field: "visible", .. }));
        assert!(matches!(issues[1], DeserializeIssue::Value { .. }));
        assert!(net.is_visible(x));
        assert_eq!(net.semantics(x), Some(&PropertySemantics::TEXT));
        assert_eq!(net.get(x), Some(&1));
    }

    #[test]
    fn type_mismatch_skips_record() {
        let mut net = Network::new();
        let p = net.add_processor("p", ProcessorInfo::new("org.test.P", "P"));
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        let issues = net.deserialize_property(
            x,
            &json!({ "type": "org.sightline.FloatProperty", "identifier": "x", "value": 2.5 }),
        );
        assert!(matches!(issues[..], [DeserializeIssue::TypeMismatch { .. }]));
        assert_eq!(net.get(x), Some(&1));
    }
}
