// SPDX-License-Identifier: Apache-2.0

//! Host value model used by the codec.
//!
//! Containers are shared handles (`Rc<RefCell<..>>`): cloning a [`Value`] clones
//! the handle, not the graph, so a value may reference itself. The codec never
//! holds a borrow across a callback, so callbacks are free to mutate anything
//! they can reach.

use core::cell::RefCell;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Error;
use crate::invoke::Invoker;

/// Upper bound for prototype chain walks and structural comparisons.
const WALK_LIMIT: usize = 128;

/// An immutable string: UTF-8 bytes plus the number of code points.
///
/// Bytes that are not valid UTF-8 form a *byte string* whose length is 0.
#[derive(Clone)]
pub struct JsString {
    bytes: Rc<[u8]>,
    length: usize,
}

impl JsString {
    /// The empty string.
    pub fn empty() -> Self {
        Self::from_bytes(b"")
    }

    /// Create a string from raw bytes, counting code points if they are UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let length = utf8_length(bytes).unwrap_or(0);
        Self {
            bytes: Rc::from(bytes),
            length,
        }
    }

    /// Create a string from a byte vector without re-validating it twice.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let length = utf8_length(&bytes).unwrap_or(0);
        Self {
            bytes: Rc::from(bytes.into_boxed_slice()),
            length,
        }
    }

    /// Decimal rendering of an array index, as used for reviver/replacer keys.
    pub fn from_index(index: usize) -> Self {
        Self::from(index.to_string())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The string as `&str`, or `None` for a byte string.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Number of code points (0 for byte strings).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the bytes are not valid UTF-8.
    pub fn is_byte_string(&self) -> bool {
        self.length == 0 && !self.bytes.is_empty()
    }
}

/// Count code points, `None` if the bytes are not UTF-8.
pub(crate) fn utf8_length(bytes: &[u8]) -> Option<usize> {
    core::str::from_utf8(bytes).ok().map(|s| s.chars().count())
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with the `[u8]` hash for `Borrow<[u8]>` lookups.
        self.bytes[..].hash(state)
    }
}

impl core::borrow::Borrow<[u8]> for JsString {
    fn borrow(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for JsString {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        Self {
            bytes: Rc::from(s.as_bytes()),
            length: s.chars().count(),
        }
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        let length = s.chars().count();
        Self {
            bytes: Rc::from(s.into_bytes().into_boxed_slice()),
            length,
        }
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Signature of a native callable: `(invoker, this, arguments)`.
///
/// The invoker is handed through so a callable can reenter the codec.
pub type NativeFn = dyn Fn(&mut dyn Invoker, &Value, &[Value]) -> Result<Value, Error>;

/// How a [`Function`] is executed.
pub enum FunctionKind {
    /// A Rust closure, runnable by [`crate::NativeInvoker`].
    Native(Box<NativeFn>),
    /// An opaque handle into the host's own evaluator.
    Host(u64),
}

struct FunctionData {
    name: JsString,
    kind: FunctionKind,
}

/// An opaque callable.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    pub fn native<F>(name: &str, f: F) -> Self
    where
        F: Fn(&mut dyn Invoker, &Value, &[Value]) -> Result<Value, Error> + 'static,
    {
        Self(Rc::new(FunctionData {
            name: JsString::from(name),
            kind: FunctionKind::Native(Box::new(f)),
        }))
    }

    pub fn host(name: &str, handle: u64) -> Self {
        Self(Rc::new(FunctionData {
            name: JsString::from(name),
            kind: FunctionKind::Host(handle),
        }))
    }

    pub fn name(&self) -> &JsString {
        &self.0.name
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    pub fn is_native(&self) -> bool {
        matches!(self.0.kind, FunctionKind::Native(_))
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.kind {
            FunctionKind::Native(_) => write!(f, "Function({}, native)", self.0.name),
            FunctionKind::Host(handle) => write!(f, "Function({}, host #{handle})", self.0.name),
        }
    }
}

/// A named slot of an object.
#[derive(Debug, Clone)]
pub struct Property {
    pub value: Value,
    pub enumerable: bool,
}

#[derive(Default)]
struct ObjectData {
    properties: IndexMap<JsString, Property>,
    prototype: Option<Object>,
}

/// An object with insertion-ordered properties.
///
/// Replacing an existing key keeps its position; deleting a key keeps the order
/// of the remaining ones.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty object whose `get` falls back to `prototype`.
    pub fn with_prototype(prototype: Object) -> Self {
        let object = Self::new();
        object.0.borrow_mut().prototype = Some(prototype);
        object
    }

    /// Build an object from enumerable key/value pairs, later duplicates win.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<JsString>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = Self::new();
        for (key, value) in pairs {
            object.set(key, value);
        }
        object
    }

    pub fn prototype(&self) -> Option<Object> {
        self.0.borrow().prototype.clone()
    }

    /// Own property value, enumerable or not.
    pub fn get_own(&self, key: impl AsRef<[u8]>) -> Option<Value> {
        self.0
            .borrow()
            .properties
            .get(key.as_ref())
            .map(|prop| prop.value.clone())
    }

    pub fn get_own_property(&self, key: impl AsRef<[u8]>) -> Option<Property> {
        self.0.borrow().properties.get(key.as_ref()).cloned()
    }

    /// Property lookup through the prototype chain.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Value> {
        let key = key.as_ref();
        let mut current = self.clone();
        for _ in 0..WALK_LIMIT {
            if let Some(value) = current.get_own(key) {
                return Some(value);
            }
            current = current.prototype()?;
        }
        None
    }

    /// Create or replace a property. A new property is enumerable; a replaced
    /// one keeps its position and enumerability.
    pub fn set(&self, key: impl Into<JsString>, value: Value) {
        let mut data = self.0.borrow_mut();
        let key = key.into();
        match data.properties.get_mut(&key) {
            Some(prop) => prop.value = value,
            None => {
                data.properties.insert(
                    key,
                    Property {
                        value,
                        enumerable: true,
                    },
                );
            }
        }
    }

    /// Create or replace a property with an explicit enumerable flag.
    pub fn define(&self, key: impl Into<JsString>, value: Value, enumerable: bool) {
        self.0
            .borrow_mut()
            .properties
            .insert(key.into(), Property { value, enumerable });
    }

    /// Remove a property, returning whether it existed.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> bool {
        self.0
            .borrow_mut()
            .properties
            .shift_remove(key.as_ref())
            .is_some()
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.0.borrow().properties.contains_key(key.as_ref())
    }

    /// Snapshot of own enumerable keys in creation order.
    pub fn own_enumerable_keys(&self) -> Vec<JsString> {
        self.0
            .borrow()
            .properties
            .iter()
            .filter(|(_, prop)| prop.enumerable)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Number of own properties, enumerable or not.
    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().properties.is_empty()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn entries(&self) -> Vec<(JsString, Property)> {
        self.0
            .borrow()
            .properties
            .iter()
            .map(|(key, prop)| (key.clone(), prop.clone()))
            .collect()
    }
}

/// An ordered sequence of values with a live length.
///
/// Like [`Boxed`], an array carries an object for named properties and a
/// prototype, so it may expose a `toJSON`. Those properties are never
/// serialized as elements.
#[derive(Clone, Default)]
pub struct Array {
    items: Rc<RefCell<Vec<Value>>>,
    object: Object,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(values: Vec<Value>) -> Self {
        Self::with_object(values, Object::new())
    }

    /// Elements plus the object holding named properties and the prototype.
    pub fn with_object(values: Vec<Value>, object: Object) -> Self {
        Self {
            items: Rc::new(RefCell::new(values)),
            object,
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Overwrite an existing slot, returning false if `index` is out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    pub fn truncate(&self, len: usize) {
        self.items.borrow_mut().truncate(len);
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

/// The primitive inside a boxed wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Boolean(bool),
    Number(f64),
    String(JsString),
}

impl From<Primitive> for Value {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Boolean(b) => Value::Boolean(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::String(s) => Value::String(s),
        }
    }
}

/// A primitive wrapped as an object (`new String("x")` and friends).
///
/// The wrapper carries its own property table, so it may expose a `toJSON`.
#[derive(Clone)]
pub struct Boxed {
    primitive: Primitive,
    object: Object,
}

impl Boxed {
    pub fn new(primitive: Primitive) -> Self {
        Self::with_object(primitive, Object::new())
    }

    pub fn with_object(primitive: Primitive, object: Object) -> Self {
        Self { primitive, object }
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn object(&self) -> &Object {
        &self.object
    }
}

/// What an external prototype describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternKind {
    Property,
    Method,
    Object,
    CaselessObject,
}

impl ExternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternKind::Property => "property",
            ExternKind::Method => "method",
            ExternKind::Object => "object",
            ExternKind::CaselessObject => "caseless_object",
        }
    }
}

/// Host hooks an external exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternHooks {
    pub getter: bool,
    pub setter: bool,
    pub method: bool,
    pub find: bool,
    pub foreach: bool,
    pub next: bool,
}

struct ExternalData {
    name: JsString,
    kind: ExternKind,
    hooks: ExternHooks,
    members: IndexMap<JsString, External>,
}

/// A host-bound object, described by its prototype.
#[derive(Clone)]
pub struct External(Rc<ExternalData>);

impl External {
    /// Create an external; members are keyed by their own names.
    pub fn new(name: &str, kind: ExternKind, hooks: ExternHooks, members: Vec<External>) -> Self {
        let members = members
            .into_iter()
            .map(|member| (member.name().clone(), member))
            .collect();
        Self(Rc::new(ExternalData {
            name: JsString::from(name),
            kind,
            hooks,
            members,
        }))
    }

    pub fn name(&self) -> &JsString {
        &self.0.name
    }

    pub fn kind(&self) -> ExternKind {
        self.0.kind
    }

    pub fn hooks(&self) -> ExternHooks {
        self.0.hooks
    }

    pub fn member(&self, key: impl AsRef<[u8]>) -> Option<External> {
        self.0.members.get(key.as_ref()).cloned()
    }

    pub fn member_names(&self) -> Vec<JsString> {
        self.0.members.keys().cloned().collect()
    }

    pub fn has_members(&self) -> bool {
        !self.0.members.is_empty()
    }
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "External({}, {})", self.0.name, self.0.kind.as_str())
    }
}

/// Any datum of the host's value model.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(Object),
    Array(Array),
    Function(Function),
    Boxed(Boxed),
    External(External),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Plain object or array: the values the codec descends into.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    /// A container with at least one own property or element.
    pub fn is_non_empty_container(&self) -> bool {
        match self {
            Value::Object(object) => !object.is_empty(),
            Value::Array(array) => !array.is_empty(),
            _ => false,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// The callable `toJSON` property of an object, array or boxed wrapper,
    /// if any.
    pub fn to_json_hook(&self) -> Option<Function> {
        let object = match self {
            Value::Object(object) => object,
            Value::Array(array) => array.object(),
            Value::Boxed(boxed) => boxed.object(),
            _ => return None,
        };
        match object.get("toJSON") {
            Some(Value::Function(function)) => Some(function),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            Value::Boxed(_) => "boxed",
            Value::External(_) => "external",
        }
    }

    fn eq_at(&self, other: &Value, depth: usize) -> bool {
        if depth > WALK_LIMIT {
            return false;
        }
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.entries(), b.entries());
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, pa), (kb, pb))| {
                        ka == kb
                            && pa.enumerable == pb.enumerable
                            && pa.value.eq_at(&pb.value, depth + 1)
                    })
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.to_vec(), b.to_vec());
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.eq_at(y, depth + 1))
            }
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Boxed(a), Value::Boxed(b)) => a.primitive() == b.primitive(),
            (Value::External(a), Value::External(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

/// Structural equality; containers compare by contents, callables and
/// externals by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.eq_at(other, 0)
    }
}

struct DebugAt<'a>(&'a Value, usize);

impl fmt::Debug for DebugAt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DebugAt(value, depth) = *self;
        match value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(_) | Value::Array(_) if depth >= 8 => f.write_str("[..]"),
            Value::Object(object) => {
                let mut map = f.debug_map();
                for (key, prop) in object.entries() {
                    map.entry(&key, &DebugAt(&prop.value, depth + 1));
                }
                map.finish()
            }
            Value::Array(array) => {
                let mut list = f.debug_list();
                for item in array.to_vec().iter() {
                    list.entry(&DebugAt(item, depth + 1));
                }
                list.finish()
            }
            Value::Function(function) => write!(f, "{function:?}"),
            Value::Boxed(boxed) => write!(f, "Boxed({:?})", boxed.primitive()),
            Value::External(external) => write!(f, "{external:?}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DebugAt(self, 0).fmt(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Array::from_vec(values))
    }
}

impl From<Function> for Value {
    fn from(function: Function) -> Self {
        Value::Function(function)
    }
}

impl From<Boxed> for Value {
    fn from(boxed: Boxed) -> Self {
        Value::Boxed(boxed)
    }
}

impl From<External> for Value {
    fn from(external: External) -> Self {
        Value::External(external)
    }
}
