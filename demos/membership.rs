//! A simple membership example.
//!
//! In this example, there are two kinds of threads:
//! -   A Moderator thread will intermittently ban, and pardon, user names.
//! -   Gatekeeper threads will "model" a continuous stream of connections, and
//!     for each check the user name against the set of banned names.
//!
//! User names are compared regardless of ASCII case, by means of custom hooks.

extern crate crossbeam_utils;
extern crate stripes;

use std::hash::{Hash, Hasher};
use std::{thread, time};

use std::collections::hash_map::DefaultHasher;

use stripes::hashset::{ConcurrentHashSet, HashHooks};

const NUMBER_GATEKEEPERS: usize = 3;
const NUMBER_ROUNDS: usize = 10;
const NUMBER_USERS: usize = 50;

const PACE_TIME: time::Duration = time::Duration::from_millis(10);

#[derive(Default)]
struct CaseInsensitive;

impl HashHooks<String> for CaseInsensitive {
    fn hash(&self, name: &String) -> u64 {
        let mut hasher = DefaultHasher::new();

        for b in name.bytes() {
            b.to_ascii_lowercase().hash(&mut hasher);
        }

        hasher.finish()
    }

    fn eq(&self, left: &String, right: &String) -> bool { left.eq_ignore_ascii_case(right) }
}

fn main() {
    let banned = ConcurrentHashSet::with_hooks(CaseInsensitive);

    crossbeam_utils::thread::scope(|scope| {
        //
        //  Moderator
        //
        scope.spawn(|_| {
            for round in 0..NUMBER_ROUNDS {
                let name = format!("USER-{}", round * 7 % NUMBER_USERS);

                if banned.insert(name.clone()) {
                    println!("Moderator - banned {}", name);
                }

                if round % 3 == 2 {
                    let name = format!("user-{}", (round - 2) * 7 % NUMBER_USERS);

                    if banned.remove(&name) {
                        println!("Moderator - pardoned {}", name);
                    }
                }

                thread::sleep(PACE_TIME);
            }
        });

        //
        //  Gatekeepers
        //
        for gatekeeper in 0..NUMBER_GATEKEEPERS {
            let banned = &banned;

            scope.spawn(move |_| {
                let mut refused = 0;

                for _ in 0..NUMBER_ROUNDS {
                    //  Pin once per batch of connections.
                    let pinned = banned.pin();

                    for user in 0..NUMBER_USERS {
                        let name = format!("user-{}", user);

                        if pinned.contains(&name) {
                            refused += 1;
                        }
                    }

                    drop(pinned);
                    thread::sleep(PACE_TIME);
                }

                println!("Gatekeeper {} - refused {} connections", gatekeeper, refused);
            });
        }
    }).unwrap();

    println!("Banned: {:?}", banned);
}
