//! A simple crawler example.
//!
//! In this example, several Worker threads explore a synthetic graph of pages,
//! each page linking to a handful of others.
//!
//! The set of visited pages is shared by all Workers: `insert` returning `true`
//! elects the single Worker in charge of visiting a page, so that no page is
//! visited twice.

extern crate crossbeam_utils;
extern crate stripes;

use std::sync::atomic::{AtomicUsize, Ordering};

use stripes::hashset::ConcurrentHashSet;

const NUMBER_WORKERS: usize = 4;
const NUMBER_PAGES: u64 = 10_000;
const LINKS_PER_PAGE: u64 = 3;

//  Pseudo-random, yet deterministic, links.
fn links(page: u64) -> impl Iterator<Item = u64> {
    (1..=LINKS_PER_PAGE).map(move |i| {
        page.wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(i.wrapping_mul(1_442_695_040_888_963_407))
            % NUMBER_PAGES
    })
}

fn main() {
    let visited = ConcurrentHashSet::new();
    let visits = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        for worker in 0..NUMBER_WORKERS {
            let visited = &visited;
            let visits = &visits;

            scope.spawn(move |_| {
                //  Each Worker starts from its own page.
                let mut frontier = vec![worker as u64];

                while let Some(page) = frontier.pop() {
                    if !visited.insert(page) {
                        continue;
                    }

                    visits.fetch_add(1, Ordering::Relaxed);
                    frontier.extend(links(page).filter(|link| !visited.contains(link)));
                }

                println!("Worker {} - done", worker);
            });
        }
    }).unwrap();

    let visits = visits.into_inner();

    println!(
        "Visited {} pages, using {} buckets and {} stripes",
        visits,
        visited.bucket_count(),
        visited.stripe_count()
    );

    assert_eq!(visits, visited.len());
}
