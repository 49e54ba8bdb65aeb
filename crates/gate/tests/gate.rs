//! Integration tests for the gate dispatch algorithm.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gate::{Arguments, Container, Definition, Error, Gate, GateConfig, Handler, Method, Value};

#[derive(Debug, PartialEq)]
struct User {
    id: u32,
}

#[derive(Debug, PartialEq)]
struct Dummy {
    name: &'static str,
}

fn user_id(actor: Option<&Value>) -> Option<u32> {
    actor.and_then(|a| a.downcast_ref::<User>()).map(|u| u.id)
}

/// Target of `TestClass@foo` references.
struct TestClass;

impl Handler for TestClass {
    fn method(&self, name: &str) -> Option<Method<'_>> {
        match name {
            "foo" => Some(Box::new(|_: Option<&Value>, _: &Arguments| true)),
            "is_user" => Some(Box::new(|user: Option<&Value>, args: &Arguments| {
                user_id(user) == Some(1) && args.is_empty()
            })),
            _ => None,
        }
    }
}

/// Grants `update` to any authenticated user.
struct DummyPolicy;

impl DummyPolicy {
    fn update(&self, user: Option<&Value>, args: &Arguments) -> bool {
        user.is_some_and(|u| u.is::<User>()) && args.downcast::<Dummy>(0).is_some()
    }
}

impl Handler for DummyPolicy {
    fn method(&self, name: &str) -> Option<Method<'_>> {
        match name {
            "update" => Some(Box::new(|user: Option<&Value>, args: &Arguments| {
                self.update(user, args)
            })),
            _ => None,
        }
    }
}

/// Its `before` grants everything its `update` would deny.
struct DummyPolicyWithBefore;

impl Handler for DummyPolicyWithBefore {
    fn before(&self, _user: Option<&Value>, _ability: &str) -> Option<bool> {
        Some(true)
    }

    fn method(&self, name: &str) -> Option<Method<'_>> {
        match name {
            "update" => Some(Box::new(|_: Option<&Value>, _: &Arguments| false)),
            _ => None,
        }
    }
}

/// Only decides in `before` for admins.
struct AdminOnlyBefore;

impl Handler for AdminOnlyBefore {
    fn before(&self, user: Option<&Value>, _ability: &str) -> Option<bool> {
        (user_id(user) == Some(99)).then_some(true)
    }

    fn method(&self, name: &str) -> Option<Method<'_>> {
        match name {
            "delete" => Some(Box::new(|_: Option<&Value>, _: &Arguments| false)),
            _ => None,
        }
    }
}

fn container() -> Container {
    let container = Container::new();
    container
        .bind("TestClass", || TestClass)
        .bind("DummyPolicy", || DummyPolicy)
        .bind("DummyPolicyWithBefore", || DummyPolicyWithBefore)
        .bind("AdminOnlyBefore", || AdminOnlyBefore);
    container
}

fn basic_gate() -> Gate {
    Gate::new(container(), || Some(Value::new(User { id: 1 })))
}

#[test]
fn test_gate_rejects_invalid_callback_string() {
    let gate = basic_gate();
    assert!(matches!(gate.define("foo", "foo"), Err(Error::InvalidDefinition(_))));
    assert!(!gate.has("foo"));
}

#[test]
fn test_gate_rejects_reference_to_unknown_type() {
    let gate = basic_gate();
    assert!(matches!(
        gate.define("foo", "Missing@foo"),
        Err(Error::Unresolvable(name)) if name == "Missing"
    ));
}

#[test]
fn test_basic_closures_can_be_defined() {
    let gate = basic_gate();
    gate.define("foo", Definition::callback(|_, _| true)).unwrap();
    gate.define("bar", Definition::callback(|_, _| false)).unwrap();

    assert!(gate.check("foo", ()).unwrap());
    assert!(!gate.check("bar", ()).unwrap());
    assert!(gate.allows("foo", ()).unwrap());
    assert!(gate.denies("bar", ()).unwrap());
}

#[test]
fn test_before_callbacks_can_override_result() {
    let gate = basic_gate();
    gate.define("foo", Definition::callback(|_, _| true)).unwrap();
    gate.before(|_, ability, _| {
        assert_eq!(ability, "foo");
        Some(false)
    });

    assert!(!gate.check("foo", ()).unwrap());
}

#[test]
fn test_before_callbacks_without_opinion_do_not_interrupt() {
    let gate = basic_gate();
    gate.define("foo", Definition::callback(|_, _| true)).unwrap();
    gate.before(|_, _, _| None);

    assert!(gate.check("foo", ()).unwrap());
}

#[test]
fn test_last_before_callback_with_opinion_wins() {
    let gate = basic_gate();
    let consulted = Arc::new(AtomicUsize::new(0));
    gate.define("foo", Definition::callback(|_, _| false)).unwrap();

    for opinion in [Some(false), Some(true), None] {
        let consulted = consulted.clone();
        gate.before(move |_, _, _| {
            consulted.fetch_add(1, Ordering::SeqCst);
            opinion
        });
    }

    assert!(gate.check("foo", ()).unwrap());
    assert_eq!(consulted.load(Ordering::SeqCst), 3);
}

#[test]
fn test_before_callbacks_short_circuit_policies_and_abilities() {
    let gate = basic_gate();
    let reached = Arc::new(AtomicBool::new(false));
    let flag = reached.clone();
    gate.define(
        "update",
        Definition::callback(move |_, _| {
            flag.store(true, Ordering::SeqCst);
            true
        }),
    )
    .unwrap();
    gate.policy::<Dummy>("DummyPolicy");
    gate.before(|_, _, _| Some(false));

    assert!(!gate.check("update", Value::new(Dummy { name: "a" })).unwrap());
    assert!(!reached.load(Ordering::SeqCst));
}

#[test]
fn test_current_user_is_injected_into_callbacks_and_hooks() {
    let gate = basic_gate();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = seen.clone();
    gate.before(move |user, _, _| {
        hook_seen.lock().unwrap().push(user_id(user));
        None
    });
    gate.define(
        "foo",
        Definition::callback(|user: Option<&Value>, _: &Arguments| {
            assert_eq!(user_id(user), Some(1));
            true
        }),
    )
    .unwrap();

    assert!(gate.check("foo", ()).unwrap());
    assert_eq!(*seen.lock().unwrap(), vec![Some(1)]);
}

#[test]
fn test_a_single_argument_can_be_passed() {
    let gate = basic_gate();
    let dummy = Value::new(Dummy { name: "only" });
    let expected = dummy.clone();

    gate.define(
        "foo",
        Definition::callback(move |_, args: &Arguments| {
            args.len() == 1 && args.first().is_some_and(|x| x.ptr_eq(&expected))
        }),
    )
    .unwrap();

    assert!(gate.check("foo", dummy.clone()).unwrap());
    assert!(gate.check("foo", vec![dummy]).unwrap());
}

#[test]
fn test_multiple_arguments_can_be_passed() {
    let gate = basic_gate();
    gate.define(
        "foo",
        Definition::callback(|_, args: &Arguments| {
            args.downcast::<Dummy>(0) == Some(&Dummy { name: "first" })
                && args.downcast::<Dummy>(1) == Some(&Dummy { name: "second" })
        }),
    )
    .unwrap();

    let args = [Value::new(Dummy { name: "first" }), Value::new(Dummy { name: "second" })];
    assert!(gate.check("foo", args).unwrap());
}

#[test]
fn test_classes_can_be_defined_as_callbacks_using_at_notation() {
    let gate = basic_gate();
    gate.define("foo", "TestClass@foo").unwrap();
    gate.define("is-user", "TestClass@is_user").unwrap();

    assert!(gate.check("foo", ()).unwrap());
    assert!(gate.check("is-user", ()).unwrap());
    assert!(!gate.for_user(None::<Value>).check("is-user", ()).unwrap());
}

#[test]
fn test_reference_to_missing_method_fails_at_check() {
    let gate = basic_gate();
    gate.define("nope", "TestClass@nope").unwrap();

    assert!(matches!(
        gate.check("nope", ()),
        Err(Error::UndefinedMethod { handler, method }) if handler == "TestClass" && method == "nope"
    ));
}

#[test]
fn test_policy_classes_handle_checks_for_their_type() {
    let gate = basic_gate();
    gate.policy::<Dummy>("DummyPolicy");

    assert!(gate.check("update", Value::new(Dummy { name: "a" })).unwrap());
    assert!(!gate.for_user(None::<Value>).check("update", Value::new(Dummy { name: "a" })).unwrap());
}

#[test]
fn test_policies_may_have_before_methods_to_override_checks() {
    let gate = basic_gate();
    gate.policy::<Dummy>("DummyPolicyWithBefore");

    assert!(gate.check("update", Value::new(Dummy { name: "a" })).unwrap());
}

#[test]
fn test_policy_before_without_opinion_lets_method_answer() {
    let gate = basic_gate();
    gate.policy::<Dummy>("AdminOnlyBefore");

    assert!(!gate.check("delete", Value::new(Dummy { name: "a" })).unwrap());
    let admin = gate.for_user(Value::new(User { id: 99 }));
    assert!(admin.check("delete", Value::new(Dummy { name: "a" })).unwrap());
}

#[test]
fn test_policies_always_override_closures_with_same_name() {
    // Registration order must not matter.
    for policy_first in [false, true] {
        let gate = basic_gate();
        if policy_first {
            gate.policy::<Dummy>("DummyPolicy");
        }
        gate.define("update", Definition::callback(|_, _| -> bool { panic!("closure must not run") }))
            .unwrap();
        if !policy_first {
            gate.policy::<Dummy>("DummyPolicy");
        }

        assert!(gate.check("update", Value::new(Dummy { name: "a" })).unwrap());
    }
}

#[test]
fn test_policy_without_matching_method_falls_through() {
    let gate = basic_gate();
    gate.policy::<Dummy>("DummyPolicy");
    gate.define("publish", Definition::callback(|_, _| true)).unwrap();

    assert!(gate.check("publish", Value::new(Dummy { name: "a" })).unwrap());
    assert!(!gate.check("archive", Value::new(Dummy { name: "a" })).unwrap());
}

#[test]
fn test_subjects_without_policy_use_abilities() {
    let gate = basic_gate();
    gate.policy::<Dummy>("DummyPolicyWithBefore");
    gate.define("update", Definition::callback(|_, _| false)).unwrap();

    assert!(!gate.check("update", Value::new(User { id: 5 })).unwrap());
    assert!(!gate.check("update", ()).unwrap());
}

#[test]
fn test_unresolvable_policy_is_an_error() {
    let gate = basic_gate();
    gate.policy::<Dummy>("UnboundPolicy");

    assert!(matches!(
        gate.check("update", Value::new(Dummy { name: "a" })),
        Err(Error::Resolution { name, .. }) if name == "UnboundPolicy"
    ));
    assert!(gate.policy_for(&Value::new(Dummy { name: "a" })).is_err());
}

#[test]
fn test_policy_for() {
    let gate = basic_gate();
    gate.policy::<Dummy>("DummyPolicy");

    let policy = gate.policy_for(&Value::new(Dummy { name: "a" })).unwrap();
    assert!(policy.is_some_and(|p| p.responds_to("update")));
    assert!(gate.policy_for(&Value::new(User { id: 1 })).unwrap().is_none());
}

#[test]
fn test_for_user_attaches_a_new_user_to_a_new_gate() {
    let gate = basic_gate();
    gate.define(
        "foo",
        Definition::callback(|user: Option<&Value>, _: &Arguments| user_id(user) == Some(2)),
    )
    .unwrap();

    assert!(gate.for_user(Value::new(User { id: 2 })).check("foo", ()).unwrap());
    assert!(!gate.for_user(Value::new(User { id: 3 })).check("foo", ()).unwrap());
    assert!(!gate.check("foo", ()).unwrap());
}

#[test]
fn test_for_user_with_provider() {
    let gate = basic_gate();
    gate.define(
        "foo",
        Definition::callback(|user: Option<&Value>, _: &Arguments| user_id(user) == Some(7)),
    )
    .unwrap();

    let scoped = gate.for_user_with(|| Some(Value::new(User { id: 7 })));
    assert!(scoped.check("foo", ()).unwrap());
    assert!(!gate.check("foo", ()).unwrap());
}

#[test]
fn test_redefining_an_ability_overwrites_it() {
    // Last write wins; redefinition is not an error.
    let gate = basic_gate();
    gate.define("foo", Definition::callback(|_, _| false)).unwrap();
    gate.define("foo", Definition::callback(|_, _| true)).unwrap();

    assert!(gate.check("foo", ()).unwrap());
    assert_eq!(gate.abilities(), vec!["foo".to_string()]);
}

#[test]
fn test_any_and_none() {
    let gate = basic_gate();
    gate.define("read", Definition::callback(|_, _| true)).unwrap();
    gate.define("write", Definition::callback(|_, _| false)).unwrap();

    assert!(gate.any(["write", "read"], ()).unwrap());
    assert!(!gate.any(["write", "missing"], ()).unwrap());
    assert!(gate.none(["write", "missing"], ()).unwrap());
    assert!(!gate.none(["read"], ()).unwrap());
}

#[test]
fn test_after_callbacks_observe_every_result() {
    let gate = basic_gate();
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = results.clone();
    gate.define("foo", Definition::callback(|_, _| true)).unwrap();
    gate.after(move |user, ability, allowed, _| {
        sink.lock().unwrap().push((user_id(user), ability.to_string(), allowed));
    });

    gate.check("foo", ()).unwrap();
    gate.check("bar", ()).unwrap();
    gate.before(|_, _, _| Some(false));
    gate.check("foo", ()).unwrap();

    assert_eq!(
        *results.lock().unwrap(),
        vec![
            (Some(1), "foo".to_string(), true),
            (Some(1), "bar".to_string(), false),
            (Some(1), "foo".to_string(), false),
        ]
    );
}

#[test]
fn test_gate_seeded_from_config() {
    let config = GateConfig::parse(
        r#"
[abilities]
foo = "TestClass@foo"
is-user = "TestClass@is_user"
"#,
    )
    .unwrap();
    let gate = Gate::from_config(container(), || Some(Value::new(User { id: 1 })), &config).unwrap();

    assert_eq!(gate.abilities(), vec!["foo".to_string(), "is-user".to_string()]);
    assert!(gate.check("foo", ()).unwrap());
    assert!(gate.check("is-user", ()).unwrap());
}

#[test]
fn test_invalid_config_entry_is_rejected() {
    let config = GateConfig::parse("[abilities]\nfoo = \"foo\"\n").unwrap();
    let result = Gate::from_config(container(), || None, &config);
    assert!(matches!(result, Err(Error::InvalidDefinition(_))));
}

#[test]
fn test_gate_is_shareable_across_threads() {
    let gate = basic_gate();
    gate.define("foo", Definition::callback(|user: Option<&Value>, _: &Arguments| user_id(user) == Some(1)))
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gate = gate.clone();
            std::thread::spawn(move || gate.check("foo", ()).unwrap())
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
