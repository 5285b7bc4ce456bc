//! End-to-end scenarios through the public API: names are interned the
//! way an adapter would, then every read is checked against the writes.

use std::sync::Arc;

use tempfile::TempDir;

use aster_db::graph::{
    AddEdge, CreateNode, Direction, GetNodeProps, GetVectors, Knn, ListAdjacency, TaggedVector,
    UpsertNodeProps, UpsertVector, VectorF32,
};
use aster_db::{Environment, Error, Property, Store, Value};

fn setup_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::open(temp_dir.path().join("api_tests")).unwrap();
    (temp_dir, Store::new(Arc::new(env)))
}

fn vec_f32(floats: &[f32]) -> VectorF32 {
    let mut data = Vec::with_capacity(floats.len() * 4);
    for f in floats {
        data.extend_from_slice(&f.to_le_bytes());
    }
    VectorF32 {
        dim: floats.len() as u16,
        data,
    }
}

#[test]
fn scenario_create_update_and_read_back_node() -> anyhow::Result<()> {
    let (_tmp, store) = setup_store();

    let label_a = store.get_or_create_label_id("a", true)?;
    let label_c = store.get_or_create_label_id("c", true)?;
    let k1 = store.get_or_create_prop_key_id("k1", true)?;
    let k2 = store.get_or_create_prop_key_id("k2", true)?;
    let k3 = store.get_or_create_prop_key_id("k3", true)?;
    let tag_v = store.get_or_create_vec_tag_id("v", true, None)?;

    let floats: Vec<f32> = (0..8).map(|i| i as f32 * 0.001).collect();
    let (id, header) = store
        .create_node(&CreateNode {
            labels: vec![label_a, label_c],
            hot_props: vec![
                Property {
                    key_id: k1,
                    value: Value::I64(42),
                },
                Property {
                    key_id: k2,
                    value: Value::Bool(true),
                },
            ],
            cold_props: vec![Property {
                key_id: k3,
                value: Value::Bytes(b"hello".to_vec()),
            }],
            vectors: vec![TaggedVector {
                tag_id: tag_v,
                vector: vec_f32(&floats),
            }],
        })
        .unwrap();
    assert!(id > 0);
    assert_eq!(header.id, id);

    // Labels read back order-independent; resolve names for the check.
    let got = store.get_node(id).unwrap();
    let mut names: Vec<_> = got
        .labels
        .iter()
        .map(|&l| store.label_name(l).unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a", "c"]);
    let mut hot_keys: Vec<_> = got.hot_props.iter().map(|p| p.key_id).collect();
    hot_keys.sort_unstable();
    assert_eq!(hot_keys, vec![k1.min(k2), k1.max(k2)]);

    let vectors = store
        .get_vectors(&GetVectors { id, tag_ids: vec![] })
        .unwrap();
    assert_eq!(vectors.len(), 1);
    assert_eq!(vectors[0].vector.dim, 8);
    assert_eq!(vectors[0].vector.data.len(), 32);
    assert_eq!(vectors[0].vector.data, vec_f32(&floats).data);

    // Scenario 2: upsert with unset and an interned cold text value.
    let k4 = store.get_or_create_prop_key_id("k4", true).unwrap();
    let cold_text = store.intern_text("cold-text").unwrap();
    store
        .upsert_node_props(&UpsertNodeProps {
            id,
            set_hot: vec![
                Property {
                    key_id: k1,
                    value: Value::F64(3.14),
                },
                Property {
                    key_id: k4,
                    value: Value::Bool(false),
                },
            ],
            set_cold: vec![Property {
                key_id: k3,
                value: cold_text.clone(),
            }],
            unset_keys: vec![k2],
        })
        .unwrap();

    let mut props = store
        .get_node_props(&GetNodeProps { id, key_ids: vec![] })
        .unwrap();
    props.sort_by_key(|p| p.key_id);
    assert_eq!(
        props,
        vec![
            Property {
                key_id: k1,
                value: Value::F64(3.14),
            },
            Property {
                key_id: k3,
                value: cold_text.clone(),
            },
            Property {
                key_id: k4,
                value: Value::Bool(false),
            },
        ]
    );
    // The interned value expands back to its text on the wire.
    assert_eq!(
        store.text_value(&cold_text)?,
        Some("cold-text".to_string())
    );
    Ok(())
}

#[test]
fn scenario_parallel_edges_then_cascade_delete() {
    let (_tmp, store) = setup_store();

    let a = store.create_node(&CreateNode::default()).unwrap().0;
    let b = store.create_node(&CreateNode::default()).unwrap().0;
    let t1 = store.get_or_create_rel_type_id("t1", true).unwrap();
    let t2 = store.get_or_create_rel_type_id("t2", true).unwrap();
    let tag = store.get_or_create_vec_tag_id("bvec", true, None).unwrap();

    store
        .upsert_vector(&UpsertVector {
            id: b,
            tag_id: tag,
            vector: vec_f32(&[1.0, 2.0]),
        })
        .unwrap();

    store
        .add_edge(&AddEdge {
            src: a,
            dst: b,
            type_id: t1,
            props: vec![],
        })
        .unwrap();
    store
        .add_edge(&AddEdge {
            src: a,
            dst: b,
            type_id: t2,
            props: vec![],
        })
        .unwrap();

    let rows = store
        .list_adjacency(&ListAdjacency {
            node: a,
            direction: Direction::Out,
            limit: 16,
        })
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.neighbor_id == b));
    let mut types: Vec<_> = rows
        .iter()
        .map(|r| store.rel_type_name(r.type_id).unwrap())
        .collect();
    types.sort();
    assert_eq!(types, vec!["t1", "t2"]);

    // Scenario 6: deleting b cleans a's adjacency and b's rows.
    store.delete_node(b).unwrap();

    let rows = store
        .list_adjacency(&ListAdjacency {
            node: a,
            direction: Direction::Out,
            limit: 16,
        })
        .unwrap();
    assert!(rows.is_empty());
    assert!(matches!(store.get_node(b), Err(Error::NotFound("node"))));
    assert!(store
        .get_vectors(&GetVectors { id: b, tag_ids: vec![] })
        .unwrap()
        .is_empty());
}

#[test]
fn scenario_vector_tag_dim_locks() {
    let (_tmp, store) = setup_store();
    let node = store.create_node(&CreateNode::default()).unwrap().0;
    let tag = store.get_or_create_vec_tag_id("x", true, None).unwrap();

    store
        .upsert_vector(&UpsertVector {
            id: node,
            tag_id: tag,
            vector: vec_f32(&[1.0, 2.0, 3.0, 4.0]),
        })
        .unwrap();

    let err = store
        .upsert_vector(&UpsertVector {
            id: node,
            tag_id: tag,
            vector: vec_f32(&[1.0, 2.0, 3.0, 4.0, 5.0]),
        })
        .unwrap_err();
    assert!(matches!(err, Error::DimMismatch(_)));
}

#[test]
fn scenario_knn_over_named_tag() {
    let (_tmp, store) = setup_store();
    let tag = store.get_or_create_vec_tag_id("x", true, None).unwrap();

    let corpus: &[&[f32]] = &[
        &[1.0, 0.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0, 0.0],
        &[0.7071, 0.7071, 0.0, 0.0],
        &[0.5, 0.5, 0.5, 0.5],
        &[-1.0, 0.0, 0.0, 0.0],
    ];
    for floats in corpus {
        store
            .create_node(&CreateNode {
                vectors: vec![TaggedVector {
                    tag_id: tag,
                    vector: vec_f32(floats),
                }],
                ..Default::default()
            })
            .unwrap();
    }

    let hits = store
        .knn(&Knn {
            tag_id: tag,
            query: vec_f32(&[1.0, 0.0, 0.0, 0.0]),
            k: 5,
        })
        .unwrap();
    assert_eq!(hits.len(), 5);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert!((hits[0].score - 1.0).abs() < 1e-4);
    assert!((hits[4].score + 1.0).abs() < 1e-4);

    assert!(store
        .knn(&Knn {
            tag_id: tag,
            query: vec_f32(&[1.0, 0.0, 0.0, 0.0]),
            k: 0,
        })
        .unwrap()
        .is_empty());

    let hits = store
        .knn(&Knn {
            tag_id: tag,
            query: vec_f32(&[0.0, 0.0, 0.0, 0.0]),
            k: 5,
        })
        .unwrap();
    assert_eq!(hits.len(), 5);
    assert!(hits.iter().all(|h| h.score == 0.0));
}

#[test]
fn read_paths_do_not_allocate_names() {
    let (_tmp, store) = setup_store();

    // Unknown names on the read path surface NotFound, which adapters
    // translate to empty results.
    assert!(matches!(
        store.get_or_create_label_id("ghost", false),
        Err(Error::NotFound(_))
    ));
    // The failed read must not have allocated the name.
    let id = store.get_or_create_label_id("ghost", true).unwrap();
    assert_eq!(store.label_name(id).unwrap(), "ghost");
    assert_eq!(id, 1);
}
