use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, SamplingMode, Throughput};

use meeting_library::config::GlobalLibraryConfig;
use meeting_library::identity::{Principal, RequestContext};
use meeting_library::storage::{AccessRecord, MemoryStore, PrincipalRecord, Resource, ResourceWriter, Role};
use meeting_library::visibility::Visibility;
use meeting_library::LibraryService;

const OWNER: &str = "u:cam:owner";

/// Owner with `n` meetings cycling through the three visibilities; every fifth one dangling.
fn build_store(n: usize) -> MemoryStore {
    let store = MemoryStore::new();
    store.put_principal(PrincipalRecord::user(OWNER, Visibility::Public));
    let vis = [Visibility::Private, Visibility::LoggedIn, Visibility::Public];
    for i in 0..n {
        let id = format!("m:cam:m{}", i);
        let r = Resource::new(&id, "meeting", vis[i % 3], "bench", i as i64);
        let mut acl = AccessRecord::for_resource(&r);
        acl.set_role(OWNER, Some(Role::Manager));
        store.put_resource(r).unwrap();
        store.put_access_record(acl).unwrap();
        if i % 5 == 0 { store.delete_resource_out_of_band(&id); }
    }
    store
}

fn bench_library(c: &mut Criterion) {
    let sizes = [100usize, 1_000usize];
    let mut group = c.benchmark_group("library");
    group.sampling_mode(SamplingMode::Flat);
    group.sample_size(20);

    for &n in &sizes {
        group.throughput(Throughput::Elements(n as u64));
        let owner = RequestContext::for_principal(Principal::user(OWNER));
        let stranger = RequestContext::for_principal(Principal::user("u:gt:stranger"));
        let no_cleanup = GlobalLibraryConfig { cleanup_dangling_references: false, ..Default::default() };

        // Purge + rebuild + first page
        group.bench_with_input(BenchmarkId::new("rebuild_first_page", n), &n, |b, &n| {
            let store = build_store(n);
            let svc = LibraryService::with_memory_store(no_cleanup.clone(), &store);
            b.iter(|| {
                svc.purge("meetings", OWNER).unwrap();
                criterion::black_box(svc.get_library("meetings", OWNER, &owner, None, Some(25)).unwrap());
            });
        });

        // Built library, filtered read as a stranger (public only)
        group.bench_with_input(BenchmarkId::new("filtered_page_stranger", n), &n, |b, &n| {
            let store = build_store(n);
            let svc = LibraryService::with_memory_store(no_cleanup.clone(), &store);
            svc.get_library("meetings", OWNER, &owner, None, None).unwrap();
            b.iter(|| {
                criterion::black_box(svc.get_library("meetings", OWNER, &stranger, None, Some(25)).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_library);
criterion_main!(benches);
