use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, LazyLock, Mutex};
use stratum::di::{Container, Dependencies, InjectSpec, Injectable, inject};
use stratum::metadata::{
    Class, DecorationSite, InspectionOptions, MetadataError, MetadataInspector, MetadataStore,
    ParameterDecoratorFactory,
};
use stratum::{Result, StratumError};
use tracing_subscriber::fmt::MakeWriter;

struct Clock {
    now: u64,
}

struct Logger;

struct AuditService {
    clock: Arc<Clock>,
    logger: Option<Arc<Logger>>,
}

static AUDIT_SERVICE: LazyLock<Class> = LazyLock::new(|| {
    let class = Class::builder("AuditService")
        .constructor(1)
        .property("logger")
        .build();
    inject::constructor_param(&class, 0, InjectSpec::new("clock")).expect("clock injection");
    inject::property(&class, "logger", InjectSpec::new("logger").optional())
        .expect("logger injection");
    class
});

impl Injectable for AuditService {
    fn class() -> Class {
        AUDIT_SERVICE.clone()
    }

    fn construct(deps: Dependencies) -> Result<Self> {
        Ok(Self {
            clock: deps.arg(0)?,
            logger: deps.optional_property("logger")?,
        })
    }
}

// Inherits every injection of AuditService without declaring its own.
struct ScopedAuditService {
    inner: AuditService,
}

static SCOPED_AUDIT_SERVICE: LazyLock<Class> = LazyLock::new(|| {
    Class::builder("ScopedAuditService")
        .extends(&AUDIT_SERVICE)
        .build()
});

impl Injectable for ScopedAuditService {
    fn class() -> Class {
        SCOPED_AUDIT_SERVICE.clone()
    }

    fn construct(deps: Dependencies) -> Result<Self> {
        Ok(Self {
            inner: AuditService::construct(deps)?,
        })
    }
}

struct Undeclared;

static UNDECLARED: LazyLock<Class> =
    LazyLock::new(|| Class::builder("Undeclared").constructor(1).build());

impl Injectable for Undeclared {
    fn class() -> Class {
        UNDECLARED.clone()
    }

    fn construct(_deps: Dependencies) -> Result<Self> {
        Ok(Self)
    }
}

#[test]
fn instantiates_from_declared_injections() {
    let mut container = Container::new();
    container.bind("clock", Clock { now: 7 });

    let service = container.instantiate::<AuditService>().unwrap();
    assert_eq!(service.clock.now, 7);
    assert!(service.logger.is_none());

    container.bind("logger", Logger);
    let service = container.instantiate::<AuditService>().unwrap();
    assert!(service.logger.is_some());
}

#[test]
fn subclass_uses_inherited_injections() {
    let mut container = Container::new();
    container.bind("clock", Clock { now: 1 });

    let service = container.instantiate::<ScopedAuditService>().unwrap();
    assert_eq!(service.inner.clock.now, 1);
}

#[test]
fn missing_binding_and_missing_declaration_fail() {
    let container = Container::new();
    assert!(matches!(
        container.instantiate::<AuditService>(),
        Err(StratumError::DependencyNotFound { key }) if key == "clock"
    ));

    let err = container.instantiate::<Undeclared>().err().unwrap();
    assert_eq!(
        err.to_string(),
        "No injection declared for parameter Undeclared.constructor[0]"
    );
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn parameter_decorator_traces_and_reports_duplicates() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();

    let store = MetadataStore::new();
    let class = Class::builder("Greeter").method("greet", 2).build();
    let decorate = |spec: &str, index: usize| {
        ParameterDecoratorFactory::new("param", json!({ "name": spec }), None)
            .with_store(store.clone())
            .into_decorator()
            .apply(&DecorationSite::parameter(&class, "greet", index))
    };

    let (first, second) = tracing::subscriber::with_default(subscriber, || {
        let first = decorate("name", 1);
        (first, decorate("again", 1))
    });
    first.unwrap();
    let err = second.unwrap_err();
    assert!(matches!(err, MetadataError::DuplicateDecoration { .. }));
    assert_eq!(
        err.to_string(),
        "Decorator cannot be applied more than once on parameter Greeter.prototype.greet[1]"
    );
    let trace = r#"parameter Greeter.prototype.greet[1]: {"greet":[null,{"name":"name"}]}"#;
    assert!(logs.contents().contains(trace));

    let params = MetadataInspector::new(store)
        .get_all_parameter_metadata::<Value>(
            "param",
            &class.prototype(),
            "greet",
            InspectionOptions::own_only(),
        )
        .unwrap();
    assert_eq!(params, vec![None, Some(json!({ "name": "name" }))]);
}
