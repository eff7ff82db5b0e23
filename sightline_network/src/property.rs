// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property storage and the change propagation state machine.

use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use sightline_observe::{ObserverId, Observers};

use crate::attributes::{
    AttributeChange, InvalidationLevel, PropertySemantics, SerializationMode, Tracked, UsageMode,
};
use crate::builder::{Coerce, PropertyBuilder};
use crate::id::{Property, PropertyId};
use crate::network::Network;
use crate::owner::Child;
use crate::value::{Button, ErasedValue, PropertyValue};

/// Handle of a registered widget, see [`Network::register_widget`].
pub type WidgetId = ObserverId;

/// A view of a property that refreshes itself when the value changes.
///
/// Widgets are held weakly: dropping the last `Rc` of a widget unregisters it.
pub trait PropertyWidget {
    /// Called after `property` was modified, unless this widget initiated the
    /// modification.
    fn update_from_property(&self, network: &Network, property: PropertyId);
}

pub(crate) type ChangeCallback = Rc<dyn Fn(&mut Network)>;
pub(crate) type AttributeCallback = Rc<dyn Fn(PropertyId, &AttributeChange)>;

pub(crate) struct PropertyData {
    pub(crate) identifier: String,
    pub(crate) class_identifier: &'static str,
    pub(crate) display_name: Tracked<String>,
    pub(crate) read_only: Tracked<bool>,
    pub(crate) visible: Tracked<bool>,
    pub(crate) usage_mode: Tracked<UsageMode>,
    pub(crate) semantics: Tracked<PropertySemantics>,
    pub(crate) invalidation_level: InvalidationLevel,
    pub(crate) serialization_mode: SerializationMode,
    pub(crate) modified: bool,
    pub(crate) owner: Option<crate::id::OwnerId>,
    pub(crate) value: ErasedValue,
    pub(crate) default_value: ErasedValue,
    pub(crate) coerce: Option<Coerce>,
    pub(crate) metadata: Map<String, Value>,
    pub(crate) on_change: Observers<ChangeCallback>,
    pub(crate) attribute_observers: Observers<AttributeCallback>,
    pub(crate) widgets: Observers<Weak<dyn PropertyWidget>>,
    pub(crate) initiating_widget: Option<WidgetId>,
}

impl PropertyData {
    pub(crate) fn from_builder<T: PropertyValue>(
        builder: PropertyBuilder<T>,
        default_mode: SerializationMode,
    ) -> Self {
        let coerce = PropertyBuilder::erased_coerce(builder.coerce);
        let mut value = ErasedValue::new(builder.value);
        if let Some(coerce) = &coerce {
            coerce(&mut value);
        }
        Self {
            identifier: builder.identifier,
            class_identifier: builder.class_identifier.unwrap_or(T::CLASS_IDENTIFIER),
            display_name: Tracked::new("displayName", builder.display_name),
            read_only: Tracked::new("readonly", builder.read_only),
            visible: Tracked::new("visible", builder.visible),
            usage_mode: Tracked::new("usageMode", builder.usage_mode),
            semantics: Tracked::new("semantics", builder.semantics),
            invalidation_level: builder.invalidation_level,
            serialization_mode: builder.serialization_mode.unwrap_or(default_mode),
            modified: false,
            owner: None,
            default_value: value.clone_value(),
            value,
            coerce,
            metadata: Map::new(),
            on_change: Observers::new(),
            attribute_observers: Observers::new(),
            widgets: Observers::new(),
            initiating_widget: None,
        }
    }
}

// ============================================================================
// Values
// ============================================================================

impl Network {
    pub(crate) fn property(&self, id: PropertyId) -> Option<&PropertyData> {
        self.properties.get(id.0)
    }

    pub(crate) fn property_mut(&mut self, id: PropertyId) -> Option<&mut PropertyData> {
        self.properties.get_mut(id.0)
    }

    /// Returns `true` if `id` refers to a live property.
    #[must_use]
    pub fn contains_property(&self, id: impl Into<PropertyId>) -> bool {
        self.properties.contains(id.into().0)
    }

    /// Current value of a property, or `None` for a stale handle.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.property(property.id())?.value.downcast_ref()
    }

    /// Recovers a typed handle, e.g. from [`find_property`](Self::find_property).
    ///
    /// Returns `None` for a stale handle or if the property does not hold a
    /// `T`.
    #[must_use]
    pub fn typed<T: PropertyValue>(&self, id: PropertyId) -> Option<Property<T>> {
        self.property(id)
            .filter(|p| p.value.is::<T>())
            .map(|_| Property::from_id(id))
    }

    /// Current value of a property without static type information.
    #[must_use]
    pub fn get_erased(&self, id: impl Into<PropertyId>) -> Option<&ErasedValue> {
        self.property(id.into()).map(|p| &p.value)
    }

    /// Default value of a property.
    #[must_use]
    pub fn default_value<T: PropertyValue>(&self, property: Property<T>) -> Option<&T> {
        self.property(property.id())?.default_value.downcast_ref()
    }

    /// Sets a property value.
    ///
    /// The value is coerced first. If the result equals the stored value
    /// nothing happens and `false` is returned. Otherwise the value is stored,
    /// [`property_modified`](Self::property_modified) runs, and `true` is
    /// returned. Stale handles are logged and ignored.
    pub fn set<T: PropertyValue>(&mut self, property: Property<T>, value: T) -> bool {
        self.set_erased(property.id(), ErasedValue::new(value))
    }

    /// Untyped [`set`](Self::set); values of the wrong type are logged and ignored.
    pub fn set_erased(&mut self, id: impl Into<PropertyId>, mut value: ErasedValue) -> bool {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            log::warn!("set: stale property handle {id:?}");
            return false;
        };
        if data.value.type_id() != value.type_id() {
            log::warn!(
                "set: `{}` expects {}, got {}",
                data.identifier,
                data.value.type_name(),
                value.type_name()
            );
            return false;
        }
        if let Some(coerce) = data.coerce.clone() {
            coerce(&mut value);
        }
        if data.value.value_eq(&value) {
            return false;
        }
        data.value = value;
        self.property_modified(id);
        true
    }

    /// Edits a copy of the value in place and stores it with [`set`](Self::set).
    pub fn update<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        edit: impl FnOnce(&mut T),
    ) -> bool {
        let Some(mut value) = self.get(property).cloned() else {
            log::warn!("update: stale property handle {:?}", property.id());
            return false;
        };
        edit(&mut value);
        self.set(property, value)
    }

    /// Presses a button property.
    pub fn press(&mut self, button: Property<Button>) {
        self.property_modified(button.id());
    }

    /// Runs the full modification cascade for a property, whether or not its
    /// value changed.
    ///
    /// Inside one network lock, in this order:
    ///
    /// 1. the property's change callbacks run;
    /// 2. the property is flagged modified;
    /// 3. the owning processor's property-change observers are told about the
    ///    property, and links from it are evaluated;
    /// 4. if the property's invalidation level is above
    ///    [`Valid`](InvalidationLevel::Valid), its owner chain is invalidated
    ///    up to the processor;
    /// 5. every registered widget except the initiating one is updated.
    ///
    /// Evaluation requested by step 4 is issued once the outermost lock is
    /// released, so nested modifications made by callbacks coalesce into a
    /// single request.
    pub fn property_modified(&mut self, id: impl Into<PropertyId>) {
        let id = id.into();
        if !self.properties.contains(id.0) {
            log::warn!("property_modified: stale property handle {id:?}");
            return;
        }
        self.batch(|net| {
            if let Some(callbacks) = net.property(id).map(|p| p.on_change.snapshot()) {
                for (callback_id, callback) in callbacks {
                    let live = net
                        .property(id)
                        .is_some_and(|p| p.on_change.contains(callback_id));
                    if live {
                        callback(net);
                    }
                }
            }

            // A callback may have removed the property.
            let Some(data) = net.property_mut(id) else {
                return;
            };
            data.modified = true;
            let owner = data.owner;

            let processor = owner.and_then(|owner| net.processor_of_owner(owner));
            if let Some(processor) = processor {
                net.notify_property_change(processor, Some(id));
                net.evaluate_links_from(id);
            }

            if let Some(data) = net.property(id)
                && data.invalidation_level > InvalidationLevel::Valid
                && let Some(owner) = data.owner
            {
                let level = data.invalidation_level;
                net.invalidate_owner(owner, level, Some(id));
            }

            net.update_widgets(id);
        });
    }

    /// Reports a change that does not affect evaluation results, such as a new
    /// display name.
    ///
    /// Only the owning processor's property-change observers are informed, with
    /// no property attached; nothing is invalidated and links are not evaluated.
    pub fn notify_about_change(&mut self, id: impl Into<PropertyId>) {
        let id = id.into();
        let processor = self
            .property(id)
            .and_then(|p| p.owner)
            .and_then(|owner| self.processor_of_owner(owner));
        if let Some(processor) = processor {
            self.notify_property_change(processor, None);
        }
    }

    /// Whether the property was modified since its owner was last evaluated.
    #[must_use]
    pub fn is_modified(&self, id: impl Into<PropertyId>) -> bool {
        self.property(id.into()).is_some_and(|p| p.modified)
    }

    /// Sets or clears the modified flag directly.
    pub fn set_property_modified(&mut self, id: impl Into<PropertyId>, modified: bool) {
        if let Some(data) = self.property_mut(id.into()) {
            data.modified = modified;
        }
    }

    /// Restores the default read-only flag and value, then runs
    /// [`property_modified`](Self::property_modified).
    pub fn reset_to_default_state(&mut self, id: impl Into<PropertyId>) {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            log::warn!("reset_to_default_state: stale property handle {id:?}");
            return;
        };
        data.read_only.reset();
        data.value = data.default_value.clone_value();
        let read_only = *data.read_only.value();
        self.notify_attribute(id, &AttributeChange::ReadOnly(read_only));
        self.property_modified(id);
    }

    /// Makes the current read-only flag, semantics and value the defaults.
    pub fn set_current_state_as_default(&mut self, id: impl Into<PropertyId>) {
        if let Some(data) = self.property_mut(id.into()) {
            data.read_only.set_as_default();
            data.semantics.set_as_default();
            data.default_value = data.value.clone_value();
        }
    }

    /// Whether the value equals the default value.
    #[must_use]
    pub fn is_default_value(&self, id: impl Into<PropertyId>) -> bool {
        self.property(id.into())
            .is_some_and(|p| p.value.value_eq(&p.default_value))
    }
}

// ============================================================================
// Attributes
// ============================================================================

impl Network {
    /// Identifier, unique among the owner's children.
    #[must_use]
    pub fn identifier(&self, id: impl Into<PropertyId>) -> Option<&str> {
        self.property(id.into()).map(|p| p.identifier.as_str())
    }

    /// Class identifier of the property kind.
    #[must_use]
    pub fn class_identifier(&self, id: impl Into<PropertyId>) -> Option<&'static str> {
        self.property(id.into()).map(|p| p.class_identifier)
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self, id: impl Into<PropertyId>) -> Option<&str> {
        self.property(id.into()).map(|p| p.display_name.value().as_str())
    }

    /// Read-only flag; `false` for stale handles.
    #[must_use]
    pub fn is_read_only(&self, id: impl Into<PropertyId>) -> bool {
        self.property(id.into()).is_some_and(|p| *p.read_only.value())
    }

    /// Visibility; `false` for stale handles.
    #[must_use]
    pub fn is_visible(&self, id: impl Into<PropertyId>) -> bool {
        self.property(id.into()).is_some_and(|p| *p.visible.value())
    }

    /// Usage mode.
    #[must_use]
    pub fn usage_mode(&self, id: impl Into<PropertyId>) -> Option<UsageMode> {
        self.property(id.into()).map(|p| *p.usage_mode.value())
    }

    /// Presentation hint.
    #[must_use]
    pub fn semantics(&self, id: impl Into<PropertyId>) -> Option<&PropertySemantics> {
        self.property(id.into()).map(|p| p.semantics.value())
    }

    /// How far a value change invalidates the owner.
    #[must_use]
    pub fn property_invalidation_level(&self, id: impl Into<PropertyId>) -> Option<InvalidationLevel> {
        self.property(id.into()).map(|p| p.invalidation_level)
    }

    /// Serialization mode.
    #[must_use]
    pub fn serialization_mode(&self, id: impl Into<PropertyId>) -> Option<SerializationMode> {
        self.property(id.into()).map(|p| p.serialization_mode)
    }

    /// Renames a property.
    ///
    /// # Panics
    ///
    /// Panics if another child of the same owner already uses `identifier`.
    pub fn set_identifier(&mut self, id: impl Into<PropertyId>, identifier: impl Into<String>) {
        let id = id.into();
        let identifier = identifier.into();
        let Some(owner) = self.property(id).map(|p| p.owner) else {
            log::warn!("set_identifier: stale property handle {id:?}");
            return;
        };
        if let Some(owner) = owner {
            assert!(
                !self.identifier_taken(owner, &identifier, Some(Child::Property(id))),
                "identifier `{identifier}` already exists in `{}`",
                self.owner_path(owner).join(".")
            );
        }
        if let Some(data) = self.property_mut(id) {
            data.identifier.clone_from(&identifier);
        }
        self.notify_attribute(id, &AttributeChange::Identifier(identifier));
        self.notify_about_change(id);
    }

    /// Sets the display name.
    pub fn set_display_name(&mut self, id: impl Into<PropertyId>, name: impl Into<String>) {
        let id = id.into();
        let name = name.into();
        let Some(data) = self.property_mut(id) else {
            return;
        };
        data.display_name.set(name.clone());
        self.notify_attribute(id, &AttributeChange::DisplayName(name));
        self.notify_about_change(id);
    }

    /// Sets the read-only flag.
    pub fn set_read_only(&mut self, id: impl Into<PropertyId>, read_only: bool) {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            return;
        };
        data.read_only.set(read_only);
        self.notify_attribute(id, &AttributeChange::ReadOnly(read_only));
        self.notify_about_change(id);
    }

    /// Sets visibility.
    pub fn set_visible(&mut self, id: impl Into<PropertyId>, visible: bool) {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            return;
        };
        data.visible.set(visible);
        self.notify_attribute(id, &AttributeChange::Visible(visible));
        self.notify_about_change(id);
    }

    /// Sets the usage mode.
    pub fn set_usage_mode(&mut self, id: impl Into<PropertyId>, mode: UsageMode) {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            return;
        };
        data.usage_mode.set(mode);
        self.notify_attribute(id, &AttributeChange::UsageMode(mode));
        self.notify_about_change(id);
    }

    /// Sets the presentation hint.
    pub fn set_semantics(&mut self, id: impl Into<PropertyId>, semantics: PropertySemantics) {
        let id = id.into();
        let Some(data) = self.property_mut(id) else {
            return;
        };
        data.semantics.set(semantics.clone());
        self.notify_attribute(id, &AttributeChange::Semantics(semantics));
        self.notify_about_change(id);
    }

    /// Sets how far value changes invalidate the owner. Not an observable change.
    pub fn set_property_invalidation_level(
        &mut self,
        id: impl Into<PropertyId>,
        level: InvalidationLevel,
    ) {
        if let Some(data) = self.property_mut(id.into()) {
            data.invalidation_level = level;
        }
    }

    /// Sets the serialization mode. Not an observable change.
    pub fn set_serialization_mode(&mut self, id: impl Into<PropertyId>, mode: SerializationMode) {
        if let Some(data) = self.property_mut(id.into()) {
            data.serialization_mode = mode;
        }
    }

    /// Free-form metadata stored with the property and serialized as `metaData`.
    #[must_use]
    pub fn metadata(&self, id: impl Into<PropertyId>, key: &str) -> Option<&Value> {
        self.property(id.into())?.metadata.get(key)
    }

    /// Stores a metadata entry; `Value::Null` removes it.
    pub fn set_metadata(&mut self, id: impl Into<PropertyId>, key: impl Into<String>, value: Value) {
        let Some(data) = self.property_mut(id.into()) else {
            return;
        };
        let key = key.into();
        if value.is_null() {
            data.metadata.shift_remove(&key);
        } else {
            data.metadata.insert(key, value);
        }
    }

    pub(crate) fn notify_attribute(&self, id: PropertyId, change: &AttributeChange) {
        if let Some(data) = self.property(id) {
            data.attribute_observers
                .notify_all(|_, callback| callback(id, change));
        }
    }
}

// ============================================================================
// Callbacks and widgets
// ============================================================================

impl Network {
    /// Registers a callback that runs first whenever the property is modified.
    ///
    /// The callback may freely edit the network, including removing itself.
    /// Returns `None` for a stale handle.
    pub fn on_change(
        &mut self,
        id: impl Into<PropertyId>,
        callback: impl Fn(&mut Self) + 'static,
    ) -> Option<ObserverId> {
        let data = self.property(id.into())?;
        Some(data.on_change.subscribe(Rc::new(callback)))
    }

    /// Removes a change callback; returns `false` if it was not registered.
    pub fn remove_on_change(&mut self, id: impl Into<PropertyId>, callback: ObserverId) -> bool {
        self.property(id.into())
            .is_some_and(|p| p.on_change.unsubscribe(callback))
    }

    /// Subscribes to attribute changes (identifier, display name, flags).
    pub fn observe_attributes(
        &mut self,
        id: impl Into<PropertyId>,
        callback: impl Fn(PropertyId, &AttributeChange) + 'static,
    ) -> Option<ObserverId> {
        let data = self.property(id.into())?;
        Some(data.attribute_observers.subscribe(Rc::new(callback)))
    }

    /// Removes an attribute observer.
    pub fn unobserve_attributes(&mut self, id: impl Into<PropertyId>, observer: ObserverId) -> bool {
        self.property(id.into())
            .is_some_and(|p| p.attribute_observers.unsubscribe(observer))
    }

    /// Registers a widget. The network keeps only a weak reference.
    pub fn register_widget<W: PropertyWidget + 'static>(
        &mut self,
        id: impl Into<PropertyId>,
        widget: &Rc<W>,
    ) -> Option<WidgetId> {
        let data = self.property(id.into())?;
        let weak: Weak<W> = Rc::downgrade(widget);
        let weak: Weak<dyn PropertyWidget> = weak;
        Some(data.widgets.subscribe(weak))
    }

    /// Unregisters a widget.
    pub fn unregister_widget(&mut self, id: impl Into<PropertyId>, widget: WidgetId) -> bool {
        let Some(data) = self.property_mut(id.into()) else {
            return false;
        };
        if data.initiating_widget == Some(widget) {
            data.initiating_widget = None;
        }
        data.widgets.unsubscribe(widget)
    }

    /// Number of registered widgets that are still alive.
    #[must_use]
    pub fn widget_count(&self, id: impl Into<PropertyId>) -> usize {
        self.property(id.into()).map_or(0, |p| {
            p.widgets.retain(|w| w.strong_count() > 0);
            p.widgets.len()
        })
    }

    /// Marks `widget` as the source of the next modifications, so it is not
    /// updated with its own edit.
    pub fn set_initiating_widget(&mut self, id: impl Into<PropertyId>, widget: WidgetId) {
        if let Some(data) = self.property_mut(id.into()) {
            data.initiating_widget = Some(widget);
        }
    }

    /// Clears the initiating widget.
    pub fn clear_initiating_widget(&mut self, id: impl Into<PropertyId>) {
        if let Some(data) = self.property_mut(id.into()) {
            data.initiating_widget = None;
        }
    }

    /// Sets a value on behalf of a widget: every other widget is updated, the
    /// initiating one is not.
    pub fn set_from_widget<T: PropertyValue>(
        &mut self,
        property: Property<T>,
        widget: WidgetId,
        value: T,
    ) -> bool {
        self.set_initiating_widget(property.id(), widget);
        let changed = self.set(property, value);
        self.clear_initiating_widget(property.id());
        changed
    }

    pub(crate) fn update_widgets(&self, id: PropertyId) {
        let Some(data) = self.property(id) else {
            return;
        };
        data.widgets.retain(|w| w.strong_count() > 0);
        let initiating = data.initiating_widget;
        data.widgets.notify_all(|widget_id, widget| {
            if Some(widget_id) == initiating {
                return;
            }
            if let Some(widget) = widget.upgrade() {
                widget.update_from_property(self, id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ProcessorInfo;
    use std::cell::{Cell, RefCell};

    fn network_with_processor() -> (Network, crate::id::ProcessorId) {
        let mut net = Network::new();
        let p = net.add_processor("proc", ProcessorInfo::new("org.test.Proc", "Proc"));
        net.evaluate();
        (net, p)
    }

    #[test]
    fn set_dedups_equal_values() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        net.on_change(x, move |_| c.set(c.get() + 1));

        assert!(!net.set(x, 1));
        assert_eq!(calls.get(), 0);
        assert!(!net.is_modified(x));
        assert_eq!(net.invalidation_level(p), InvalidationLevel::Valid);

        assert!(net.set(x, 2));
        assert_eq!(calls.get(), 1);
        assert!(net.is_modified(x));
        assert_eq!(net.invalidation_level(p), InvalidationLevel::InvalidOutput);
    }

    #[test]
    fn typed_handles_check_the_value_type() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        let found = net.find_property(&["proc", "x"]).unwrap();
        assert_eq!(net.typed::<i32>(found), Some(x));
        assert_eq!(net.typed::<f64>(found), None);
        net.remove_property(x);
        assert_eq!(net.typed::<i32>(found), None);
    }

    #[test]
    fn coerce_runs_before_dedup() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(
            p,
            PropertyBuilder::new("x", "X", 5_i32).coerce(|v| v.clamp(0, 10)),
        );
        assert!(net.set(x, 50));
        assert_eq!(net.get(x), Some(&10));
        assert!(!net.set(x, 99));
    }

    #[test]
    fn valid_level_never_invalidates_owner() {
        let (mut net, p) = network_with_processor();
        let label = net.add_property(
            p,
            PropertyBuilder::new("label", "Label", String::new())
                .invalidation_level(InvalidationLevel::Valid),
        );
        assert!(net.set(label, "hello".to_owned()));
        assert!(net.is_modified(label));
        assert_eq!(net.invalidation_level(p), InvalidationLevel::Valid);
    }

    #[test]
    fn wrong_type_and_stale_handles_are_ignored() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        assert!(!net.set_erased(x, ErasedValue::new(2.0_f64)));
        assert_eq!(net.get(x), Some(&1));
        assert!(net.remove_property(x));
        assert!(!net.set(x, 3));
        assert_eq!(net.get(x), None);
    }

    #[test]
    fn attribute_setters_notify_without_invalidating() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let ch = changes.clone();
        net.observe_attributes(x, move |_, change| ch.borrow_mut().push(change.clone()));
        let hook = Rc::new(RefCell::new(Vec::new()));
        let h = hook.clone();
        net.on_property_change(p, move |_, property| h.borrow_mut().push(property));

        net.set_visible(x, false);
        net.set_display_name(x, "Ex");
        net.set_semantics(x, PropertySemantics::TEXT);

        assert_eq!(
            *changes.borrow(),
            [
                AttributeChange::Visible(false),
                AttributeChange::DisplayName("Ex".to_owned()),
                AttributeChange::Semantics(PropertySemantics::TEXT),
            ]
        );
        assert_eq!(*hook.borrow(), [None, None, None]);
        assert_eq!(net.invalidation_level(p), InvalidationLevel::Valid);
        assert!(!net.is_modified(x));
    }

    #[test]
    fn reset_and_capture_default_state() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        net.set_read_only(x, true);
        net.set(x, 7);
        net.reset_to_default_state(x);
        assert!(!net.is_read_only(x));
        assert_eq!(net.get(x), Some(&1));

        net.set_read_only(x, true);
        net.set_semantics(x, PropertySemantics::COLOR);
        net.set(x, 9);
        net.set_current_state_as_default(x);
        assert!(net.is_default_value(x));
        net.set_read_only(x, false);
        net.reset_to_default_state(x);
        assert!(net.is_read_only(x));
        assert_eq!(net.get(x), Some(&9));
    }

    #[test]
    fn metadata_set_and_remove() {
        let (mut net, p) = network_with_processor();
        let x = net.add_property(p, PropertyBuilder::new("x", "X", 1_i32));
        net.set_metadata(x, "collapsed", Value::Bool(true));
        assert_eq!(net.metadata(x, "collapsed"), Some(&Value::Bool(true)));
        net.set_metadata(x, "collapsed", Value::Null);
        assert_eq!(net.metadata(x, "collapsed"), None);
    }

    #[test]
    fn update_edits_a_copy() {
        let (mut net, p) = network_with_processor();
        let v = net.add_property(p, PropertyBuilder::new("v", "V", [0.0_f32; 3]));
        assert!(net.update(v, |v| v[1] = 2.0));
        assert_eq!(net.get(v), Some(&[0.0, 2.0, 0.0]));
        assert!(!net.update(v, |_| {}));
    }
}
